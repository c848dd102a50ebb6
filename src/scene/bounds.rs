use super::{LayoutContext, NodeKind, SceneNode, Value};
use crate::text_metrics::{DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT, FontSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Zero-area boxes cannot frame a document.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    fn is_point(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    pub fn union(&self, other: &Bounds) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(x, y, right - x, bottom - y)
    }

    pub fn union_all(items: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        items
            .into_iter()
            .reduce(|acc, bounds| acc.union(&bounds))
    }
}

/// Resolves the box a node occupies in its parent's coordinate space.
///
/// Nothing is mutated; text is measured through the context's oracle, so two
/// calls on equal nodes with the same oracle always agree.
pub fn resolve_bounds(node: &SceneNode, ctx: &LayoutContext<'_>) -> Bounds {
    let x = node.x();
    let y = node.y();
    let explicit = node.number("width").zip(node.number("height"));
    match &node.kind {
        NodeKind::Rect | NodeKind::Ellipse | NodeKind::Icon | NodeKind::Illus | NodeKind::Spacer => {
            Bounds::new(
                x,
                y,
                node.number("width").unwrap_or(0.0),
                node.number("height").unwrap_or(0.0),
            )
        }
        NodeKind::Text => match explicit {
            Some((width, height)) => Bounds::new(x, y, width, height),
            None => {
                let (width, height) = measure_text_node(node, ctx);
                Bounds::new(x, y, width, height)
            }
        },
        NodeKind::Polygon => match node.get("points") {
            Some(Value::Points(points)) => Bounds::union_all(
                points.iter().map(|p| Bounds::new(p.x, p.y, 0.0, 0.0)),
            )
            .unwrap_or_else(|| Bounds::new(x, y, 0.0, 0.0)),
            _ => Bounds::new(x, y, 0.0, 0.0),
        },
        NodeKind::Path => path_bounds(node.str_prop("d").unwrap_or(""))
            .unwrap_or_else(|| Bounds::new(x, y, 0.0, 0.0)),
        NodeKind::Group => match explicit {
            Some((width, height)) => Bounds::new(x, y, width, height),
            None => {
                let content = children_bounds(&node.children, ctx)
                    .map(|bounds| bounds.translate(x, y))
                    .unwrap_or_else(|| Bounds::new(x, y, 0.0, 0.0));
                // a single declared axis overrides that axis of the content
                let (left, width) = match node.number("width") {
                    Some(width) => (x, width),
                    None => (content.x, content.width),
                };
                let (top, height) = match node.number("height") {
                    Some(height) => (y, height),
                    None => (content.y, content.height),
                };
                Bounds::new(left, top, width, height)
            }
        },
        NodeKind::Fragment => {
            children_bounds(&node.children, ctx).unwrap_or_default()
        }
        NodeKind::Component(component) => {
            let rendered = component.render(&node.props, &node.children, ctx);
            resolve_bounds(&rendered, ctx)
        }
    }
}

/// Union of the children's boxes, ignoring empty points.
pub fn children_bounds(children: &[SceneNode], ctx: &LayoutContext<'_>) -> Option<Bounds> {
    Bounds::union_all(
        children
            .iter()
            .map(|child| resolve_bounds(child, ctx))
            .filter(|bounds| !bounds.is_point()),
    )
}

/// Effective font settings of a text node, with the renderer defaults.
pub fn text_font(node: &SceneNode) -> FontSpec {
    let size = node.number("font-size").unwrap_or(DEFAULT_FONT_SIZE);
    let line_height = match node.get("line-height") {
        Some(Value::Text(raw)) if raw.trim().ends_with("px") => {
            raw.trim()
                .trim_end_matches("px")
                .parse::<f32>()
                .unwrap_or(DEFAULT_LINE_HEIGHT * size)
        }
        Some(value) => value.as_f32().unwrap_or(DEFAULT_LINE_HEIGHT) * size,
        None => DEFAULT_LINE_HEIGHT * size,
    };
    FontSpec {
        family: node.str_prop("font-family").unwrap_or("sans-serif").to_string(),
        size,
        weight: node
            .get("font-weight")
            .map(Value::to_attr)
            .unwrap_or_else(|| "normal".to_string()),
        line_height,
    }
}

fn measure_text_node(node: &SceneNode, ctx: &LayoutContext<'_>) -> (f32, f32) {
    let font = text_font(node);
    let max_width = node.number("width");
    let size = ctx.measure.measure(node.text(), &font, max_width);
    (
        max_width.unwrap_or(size.width),
        node.number("height").unwrap_or(size.height),
    )
}

/// Bounding box of the absolute coordinates in an M/L/H/V path.
fn path_bounds(d: &str) -> Option<Bounds> {
    let mut points = Vec::new();
    let mut command = 'M';
    let mut numbers: Vec<f32> = Vec::new();
    let mut last = (0.0f32, 0.0f32);
    let flush = |command: char, numbers: &mut Vec<f32>, points: &mut Vec<(f32, f32)>, last: &mut (f32, f32)| {
        match command {
            'H' => {
                for value in numbers.iter() {
                    *last = (*value, last.1);
                    points.push(*last);
                }
            }
            'V' => {
                for value in numbers.iter() {
                    *last = (last.0, *value);
                    points.push(*last);
                }
            }
            'Z' | 'z' => {}
            _ => {
                for pair in numbers.chunks_exact(2) {
                    *last = (pair[0], pair[1]);
                    points.push(*last);
                }
            }
        }
        numbers.clear();
    };
    for token in d
        .replace(',', " ")
        .split_whitespace()
        .flat_map(split_command_token)
    {
        if let Ok(value) = token.parse::<f32>() {
            numbers.push(value);
        } else if let Some(ch) = token.chars().next() {
            flush(command, &mut numbers, &mut points, &mut last);
            command = ch;
        }
    }
    flush(command, &mut numbers, &mut points, &mut last);
    Bounds::union_all(points.into_iter().map(|(x, y)| Bounds::new(x, y, 0.0, 0.0)))
}

fn split_command_token(token: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for ch in token.chars() {
        if ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            parts.push(ch.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
