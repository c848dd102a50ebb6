use super::{container, place};
use crate::scene::{Bounds, Component, LayoutContext, Props, SceneNode, resolve_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

keyword_enum!(HAlign {
    Left => "left" | "start",
    Center => "center",
    Right => "right" | "end",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

keyword_enum!(VAlign {
    Top => "top" | "start",
    Middle => "middle" | "center",
    Bottom => "bottom" | "end",
});

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AlignOptions {
    pub horizontal: HAlign,
    pub vertical: VAlign,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl AlignOptions {
    pub fn centered() -> Self {
        Self::default()
    }

    fn from_props(props: &Props) -> Self {
        let token = |key: &str| props.get(key).and_then(|value| value.as_str());
        let number = |key: &str| props.get(key).and_then(|value| value.as_f32());
        Self {
            horizontal: token("horizontal-align")
                .and_then(HAlign::from_token)
                .unwrap_or_default(),
            vertical: token("vertical-align")
                .and_then(VAlign::from_token)
                .unwrap_or_default(),
            width: number("width"),
            height: number("height"),
        }
    }
}

/// Stacks children at a shared origin, each aligned inside the stack's box.
///
/// The box is the explicit container size when given, otherwise the largest
/// child extent on each axis.
pub fn layout_align(children: &[(SceneNode, Bounds)], options: &AlignOptions) -> Vec<SceneNode> {
    let width = options
        .width
        .unwrap_or_else(|| children.iter().map(|(_, b)| b.width).fold(0.0, f32::max));
    let height = options
        .height
        .unwrap_or_else(|| children.iter().map(|(_, b)| b.height).fold(0.0, f32::max));
    children
        .iter()
        .map(|(node, bounds)| {
            let x = match options.horizontal {
                HAlign::Left => 0.0,
                HAlign::Center => (width - bounds.width) / 2.0,
                HAlign::Right => width - bounds.width,
            };
            let y = match options.vertical {
                VAlign::Top => 0.0,
                VAlign::Middle => (height - bounds.height) / 2.0,
                VAlign::Bottom => height - bounds.height,
            };
            place(node, bounds, x, y)
        })
        .collect()
}

#[derive(Debug)]
pub struct AlignLayout;

impl AlignLayout {
    pub fn node(options: AlignOptions, children: Vec<SceneNode>) -> SceneNode {
        SceneNode::component(AlignLayout)
            .prop("horizontal-align", options.horizontal.as_str())
            .prop("vertical-align", options.vertical.as_str())
            .maybe_prop("width", options.width)
            .maybe_prop("height", options.height)
            .with_children(children)
    }
}

impl Component for AlignLayout {
    fn name(&self) -> &str {
        "align-layout"
    }

    fn render(&self, props: &Props, children: &[SceneNode], ctx: &LayoutContext<'_>) -> SceneNode {
        let options = AlignOptions::from_props(props);
        let measured: Vec<(SceneNode, Bounds)> = children
            .iter()
            .map(|child| (child.clone(), resolve_bounds(child, ctx)))
            .collect();
        container(props).with_children(layout_align(&measured, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ellipse, rect, text};
    use crate::text_metrics::FixedMetrics;

    #[test]
    fn keywords_accept_aliases_and_print_canonically() {
        assert_eq!(HAlign::from_token("end"), Some(HAlign::Right));
        assert_eq!(VAlign::from_token("center"), Some(VAlign::Middle));
        assert_eq!(VAlign::Bottom.as_str(), "bottom");
        assert_eq!(HAlign::from_token("justify"), None);
    }

    #[test]
    fn icon_is_centered_over_circle() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let node = AlignLayout::node(
            AlignOptions::centered(),
            vec![ellipse().size(60.0, 60.0), rect().size(24.0, 24.0)],
        );
        let rendered = crate::scene::materialize(&node, &ctx);
        let glyph = resolve_bounds(&rendered.children[1], &ctx);
        assert_eq!(glyph, Bounds::new(18.0, 18.0, 24.0, 24.0));
    }

    #[test]
    fn explicit_box_with_bottom_right() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let child = rect().size(10.0, 10.0);
        let bounds = resolve_bounds(&child, &ctx);
        let options = AlignOptions {
            horizontal: HAlign::Right,
            vertical: VAlign::Bottom,
            width: Some(50.0),
            height: Some(30.0),
        };
        let laid = layout_align(&[(child, bounds)], &options);
        assert_eq!(resolve_bounds(&laid[0], &ctx), Bounds::new(40.0, 20.0, 10.0, 10.0));
    }

    #[test]
    fn measured_text_is_aligned_left_top() {
        let metrics = FixedMetrics { char_width: 0.5 };
        let ctx = LayoutContext::new(&metrics);
        let label = text("abcd").prop("font-size", 10.0);
        let bounds = resolve_bounds(&label, &ctx);
        let options = AlignOptions {
            horizontal: HAlign::Left,
            vertical: VAlign::Top,
            width: Some(100.0),
            height: Some(100.0),
        };
        let laid = layout_align(&[(label, bounds)], &options);
        let placed = resolve_bounds(&laid[0], &ctx);
        assert_eq!((placed.x, placed.y), (0.0, 0.0));
        assert_eq!(placed.width, 20.0);
    }
}
