use super::Document;
use crate::scene::{LayoutContext, NodeKind, Props, SceneNode, format_number, materialize, resolve_bounds};
use crate::scene::bounds::text_font;
use crate::text_metrics::{FontMetrics, TextMeasure, split_lines, wrap_line};
use anyhow::Result;
use std::path::Path;

/// Prop key selecting the horizontal anchor of a text box.
pub const H_ALIGN_KEY: &str = "data-horizontal-align";
/// Prop key selecting the vertical placement of lines inside a text box.
pub const V_ALIGN_KEY: &str = "data-vertical-align";

const GEOMETRY: [&str; 4] = ["x", "y", "width", "height"];
const TEXT_LAYOUT: [&str; 7] = ["x", "y", "width", "height", "text", "line-height", "word-wrap"];

pub fn to_svg(document: &Document) -> String {
    to_svg_with(document, &FontMetrics::default())
}

/// Serializes the document, expanding any remaining components with
/// `measure` as the text oracle.
pub fn to_svg_with(document: &Document, measure: &dyn TextMeasure) -> String {
    let ctx = LayoutContext::new(measure);
    let root = materialize(&document.root, &ctx);

    let mut svg = String::from("<svg xmlns=\"http://www.w3.org/2000/svg\"");
    if let Some(id) = &document.id {
        push_attr(&mut svg, "id", id);
    }
    if !document.class.is_empty() {
        push_attr(&mut svg, "class", &document.class.join(" "));
    }
    if let Some(width) = &document.width {
        push_attr(&mut svg, "width", &width.to_attr());
    }
    if let Some(height) = &document.height {
        push_attr(&mut svg, "height", &height.to_attr());
    }
    if let Some(view_box) = &document.view_box {
        push_attr(&mut svg, "viewBox", &view_box.to_string());
    }
    if let Some(background) = &document.background {
        push_attr(&mut svg, "style", &format!("background-color: {background}"));
    }
    for (key, value) in &document.attributes {
        push_attr(&mut svg, key, value);
    }
    svg.push('>');
    write_node(&mut svg, &root, &ctx);
    svg.push_str("</svg>");
    svg
}

fn write_node(out: &mut String, node: &SceneNode, ctx: &LayoutContext<'_>) {
    match &node.kind {
        NodeKind::Group | NodeKind::Fragment => {
            out.push_str("<g");
            let (x, y) = (node.x(), node.y());
            if x != 0.0 || y != 0.0 {
                push_attr(out, "transform", &format!("translate({},{})", format_number(x), format_number(y)));
            }
            push_props(out, &node.props, &GEOMETRY);
            out.push('>');
            for child in &node.children {
                write_node(out, child, ctx);
            }
            out.push_str("</g>");
        }
        NodeKind::Rect => write_leaf(out, "rect", &node.props, &[]),
        NodeKind::Ellipse => {
            let bounds = resolve_bounds(node, ctx);
            out.push_str("<ellipse");
            push_attr(out, "cx", &format_number(bounds.x + bounds.width / 2.0));
            push_attr(out, "cy", &format_number(bounds.y + bounds.height / 2.0));
            push_attr(out, "rx", &format_number(bounds.width / 2.0));
            push_attr(out, "ry", &format_number(bounds.height / 2.0));
            push_props(out, &node.props, &GEOMETRY);
            out.push_str("/>");
        }
        NodeKind::Polygon => write_leaf(out, "polygon", &node.props, &[]),
        NodeKind::Path => write_leaf(out, "path", &node.props, &[]),
        NodeKind::Text => write_text(out, node, ctx),
        NodeKind::Icon => write_leaf(out, "use", &node.props, &[]),
        NodeKind::Illus if node.get("href").is_some() => {
            out.push_str("<image preserveAspectRatio=\"xMidYMid slice\"");
            push_props(out, &node.props, &[]);
            out.push_str("/>");
        }
        NodeKind::Illus => {
            out.push_str("<rect fill=\"lightgray\"");
            push_props(out, &node.props, &["fill"]);
            out.push_str("/>");
        }
        NodeKind::Spacer | NodeKind::Component(_) => {}
    }
}

fn write_leaf(out: &mut String, tag: &str, props: &Props, skip: &[&str]) {
    out.push('<');
    out.push_str(tag);
    push_props(out, props, skip);
    out.push_str("/>");
}

/// Lines are centered on their line box so the output does not depend on
/// font ascent metrics.
fn write_text(out: &mut String, node: &SceneNode, ctx: &LayoutContext<'_>) {
    let font = text_font(node);
    let width = node.number("width");
    let mut lines = Vec::new();
    for line in split_lines(node.text()) {
        match width {
            Some(limit) => lines.extend(wrap_line(&line, limit, |candidate| {
                ctx.measure.line_width(candidate, &font)
            })),
            None => lines.push(line),
        }
    }
    let bounds = resolve_bounds(node, ctx);
    let (anchor, x) = match node.str_prop(H_ALIGN_KEY) {
        Some("center") => ("middle", bounds.x + bounds.width / 2.0),
        Some("right") => ("end", bounds.right()),
        _ => ("start", bounds.x),
    };
    let block = lines.len() as f32 * font.line_height;
    let top = match node.str_prop(V_ALIGN_KEY) {
        Some("middle") => bounds.y + (bounds.height - block) / 2.0,
        Some("bottom") => bounds.bottom() - block,
        _ => bounds.y,
    };

    out.push_str("<text");
    push_attr(out, "text-anchor", anchor);
    push_attr(out, "dominant-baseline", "central");
    push_props(out, &node.props, &TEXT_LAYOUT);
    out.push('>');
    for (index, line) in lines.iter().enumerate() {
        let y = top + (index as f32 + 0.5) * font.line_height;
        out.push_str(&format!(
            "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
            format_number(x),
            format_number(y),
            escape_xml(line)
        ));
    }
    out.push_str("</text>");
}

fn push_props(out: &mut String, props: &Props, skip: &[&str]) {
    for (key, value) in props {
        if skip.contains(&key.as_str()) {
            continue;
        }
        push_attr(out, key, &value.to_attr());
    }
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape_xml(value));
    out.push('"');
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &crate::config::RenderConfig, background: Option<&str>) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.raster_width, render_cfg.raster_height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid raster size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some(rgb) = background.and_then(crate::theme::parse_color) {
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255));
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Length, ViewBox};
    use crate::scene::{Point, ellipse, group, illus, polygon, rect, text};
    use crate::text_metrics::FixedMetrics;

    fn render(document: &Document) -> String {
        to_svg_with(document, &FixedMetrics::default())
    }

    #[test]
    fn root_attributes() {
        let mut document = Document::new(group());
        document.id = Some("chart".into());
        document.class = vec!["a".into(), "b".into()];
        document.width = Some(Length::Px(300.0));
        document.view_box = Some(ViewBox::new(0.0, 0.0, 300.0, 200.0));
        document.background = Some("#fff".into());
        let svg = render(&document);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"chart\" class=\"a b\" width=\"300px\""));
        assert!(svg.contains("viewBox=\"0 0 300 200\""));
        assert!(svg.contains("style=\"background-color: #fff\""));
        assert!(svg.ends_with("<g></g></svg>"));
    }

    #[test]
    fn shapes_and_groups() {
        let root = group()
            .at(5.0, 0.0)
            .child(rect().size(10.0, 20.0).prop("fill", "red"))
            .child(ellipse().at(0.0, 0.0).size(20.0, 10.0))
            .child(polygon(vec![Point::new(0.0, 0.0), Point::new(4.0, 2.5)]));
        let svg = render(&Document::new(root));
        assert!(svg.contains("<g transform=\"translate(5,0)\">"));
        assert!(svg.contains("<rect fill=\"red\" height=\"20\" width=\"10\"/>"));
        assert!(svg.contains("<ellipse cx=\"10\" cy=\"5\" rx=\"10\" ry=\"5\"/>"));
        assert!(svg.contains("points=\"0,0 4,2.5\""));
    }

    #[test]
    fn text_is_escaped_and_anchored() {
        let label = text("a < b")
            .at(10.0, 0.0)
            .size(100.0, 20.0)
            .prop("font-size", 10.0)
            .prop(H_ALIGN_KEY, "center");
        let svg = render(&Document::new(group().child(label)));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("<tspan x=\"60\" y=\"7\">a &lt; b</tspan>"));
        assert!(!svg.contains(" text=\""));
    }

    #[test]
    fn illustration_without_href_is_placeholder() {
        let svg = render(&Document::new(group().child(illus().size(40.0, 30.0))));
        assert!(svg.contains("<rect fill=\"lightgray\" height=\"30\" width=\"40\"/>"));
        let svg = render(&Document::new(
            group().child(illus().size(40.0, 30.0).prop("href", "a.png")),
        ));
        assert!(svg.contains("<image preserveAspectRatio=\"xMidYMid slice\" height=\"30\" href=\"a.png\" width=\"40\"/>"));
    }
}
