use super::{container, place};
use crate::scene::{Bounds, Component, LayoutContext, Props, SceneNode, resolve_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

keyword_enum!(FlexDirection {
    Row => "row",
    Column => "column",
});

/// Placement along one axis; `justify-content` and `align-items` share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexAlign {
    #[default]
    Start,
    Center,
    End,
}

keyword_enum!(FlexAlign {
    Start => "start" | "flex-start",
    Center => "center",
    End => "end" | "flex-end",
});

impl FlexAlign {
    fn offset(self, free: f32) -> f32 {
        match self {
            Self::Start => 0.0,
            Self::Center => free / 2.0,
            Self::End => free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlexOptions {
    pub direction: FlexDirection,
    pub justify: FlexAlign,
    pub align: FlexAlign,
    pub gap: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl FlexOptions {
    pub fn column() -> Self {
        Self {
            direction: FlexDirection::Column,
            ..Self::default()
        }
    }

    pub fn row() -> Self {
        Self::default()
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn justify(mut self, justify: FlexAlign) -> Self {
        self.justify = justify;
        self
    }

    pub fn align(mut self, align: FlexAlign) -> Self {
        self.align = align;
        self
    }

    fn from_props(props: &Props) -> Self {
        let token = |key: &str| props.get(key).and_then(|value| value.as_str());
        let number = |key: &str| props.get(key).and_then(|value| value.as_f32());
        Self {
            direction: token("flex-direction")
                .and_then(FlexDirection::from_token)
                .unwrap_or_default(),
            justify: token("justify-content")
                .and_then(FlexAlign::from_token)
                .unwrap_or_default(),
            align: token("align-items")
                .and_then(FlexAlign::from_token)
                .unwrap_or_default(),
            gap: number("gap").unwrap_or(0.0),
            width: number("width"),
            height: number("height"),
        }
    }

    fn into_props(self, props: &mut Props) {
        props.insert("flex-direction".into(), self.direction.as_str().into());
        props.insert("justify-content".into(), self.justify.as_str().into());
        props.insert("align-items".into(), self.align.as_str().into());
        props.insert("gap".into(), self.gap.into());
        if let Some(width) = self.width {
            props.insert("width".into(), width.into());
        }
        if let Some(height) = self.height {
            props.insert("height".into(), height.into());
        }
    }
}

/// Single-line flex placement over already resolved child boxes.
///
/// Children are laid out in order along the main axis with `gap` between
/// neighbours; the returned nodes are the children moved into place.
pub fn layout_flex(children: &[(SceneNode, Bounds)], options: &FlexOptions) -> Vec<SceneNode> {
    if children.is_empty() {
        return Vec::new();
    }
    let row = options.direction == FlexDirection::Row;
    let main_of = |b: &Bounds| if row { b.width } else { b.height };
    let cross_of = |b: &Bounds| if row { b.height } else { b.width };

    let content_main = children.iter().map(|(_, b)| main_of(b)).sum::<f32>()
        + options.gap * (children.len() - 1) as f32;
    let content_cross = children
        .iter()
        .map(|(_, b)| cross_of(b))
        .fold(0.0, f32::max);
    let (main_size, cross_size) = if row {
        (options.width, options.height)
    } else {
        (options.height, options.width)
    };
    let container_main = main_size.unwrap_or(content_main);
    let container_cross = cross_size.unwrap_or(content_cross);

    let mut cursor = options.justify.offset(container_main - content_main);
    children
        .iter()
        .map(|(node, bounds)| {
            let cross = options.align.offset(container_cross - cross_of(bounds));
            let placed = if row {
                place(node, bounds, cursor, cross)
            } else {
                place(node, bounds, cross, cursor)
            };
            cursor += main_of(bounds) + options.gap;
            placed
        })
        .collect()
}

/// Flex container component. Resolves its children's bounds, then delegates
/// to [`layout_flex`].
#[derive(Debug)]
pub struct FlexLayout;

impl FlexLayout {
    pub fn node(options: FlexOptions, children: Vec<SceneNode>) -> SceneNode {
        let mut node = SceneNode::component(FlexLayout).with_children(children);
        options.into_props(&mut node.props);
        node
    }
}

impl Component for FlexLayout {
    fn name(&self) -> &str {
        "flex-layout"
    }

    fn render(&self, props: &Props, children: &[SceneNode], ctx: &LayoutContext<'_>) -> SceneNode {
        let options = FlexOptions::from_props(props);
        let measured: Vec<(SceneNode, Bounds)> = children
            .iter()
            .map(|child| (child.clone(), resolve_bounds(child, ctx)))
            .collect();
        container(props).with_children(layout_flex(&measured, &options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{group, rect, spacer};
    use crate::text_metrics::FixedMetrics;

    fn boxes(sizes: &[(f32, f32)]) -> Vec<(SceneNode, Bounds)> {
        sizes
            .iter()
            .map(|(w, h)| (rect().size(*w, *h), Bounds::new(0.0, 0.0, *w, *h)))
            .collect()
    }

    #[test]
    fn row_extent_is_sum_plus_gaps() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let children = boxes(&[(30.0, 10.0), (50.0, 20.0), (20.0, 5.0), (10.0, 10.0)]);
        let laid = layout_flex(&children, &FlexOptions::row().gap(12.0));
        let bounds = resolve_bounds(&group().with_children(laid), &ctx);
        assert!((bounds.width - (110.0 + 3.0 * 12.0)).abs() < 1e-4);
        assert!((bounds.height - 20.0).abs() < 1e-4);
    }

    #[test]
    fn column_centers_on_cross_axis() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let children = boxes(&[(100.0, 10.0), (40.0, 10.0)]);
        let options = FlexOptions::column().gap(5.0).align(FlexAlign::Center);
        let laid = layout_flex(&children, &options);
        let second = resolve_bounds(&laid[1], &ctx);
        assert_eq!(second, Bounds::new(30.0, 15.0, 40.0, 10.0));
    }

    #[test]
    fn justify_end_uses_container_size() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let children = boxes(&[(20.0, 10.0), (20.0, 10.0)]);
        let options = FlexOptions {
            width: Some(100.0),
            justify: FlexAlign::End,
            ..FlexOptions::row()
        };
        let laid = layout_flex(&children, &options);
        assert_eq!(resolve_bounds(&laid[0], &ctx).x, 60.0);
        assert_eq!(resolve_bounds(&laid[1], &ctx).x, 80.0);
    }

    #[test]
    fn container_keeps_its_declared_main_size() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let options = FlexOptions {
            width: Some(100.0),
            justify: FlexAlign::Center,
            ..FlexOptions::row()
        };
        let node = FlexLayout::node(options, vec![rect().size(20.0, 10.0)]);
        assert_eq!(resolve_bounds(&node, &ctx), Bounds::new(0.0, 0.0, 100.0, 10.0));
        let rendered = crate::scene::materialize(&node, &ctx);
        assert_eq!(resolve_bounds(&rendered.children[0], &ctx).x, 40.0);
    }

    #[test]
    fn children_with_offset_origin_are_normalized() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let shifted = group().child(rect().at(-15.0, -5.0).size(30.0, 10.0));
        let bounds = resolve_bounds(&shifted, &ctx);
        let laid = layout_flex(&[(shifted, bounds)], &FlexOptions::row());
        assert_eq!(resolve_bounds(&laid[0], &ctx), Bounds::new(0.0, 0.0, 30.0, 10.0));
    }

    #[test]
    fn component_lays_out_spacers() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let node = FlexLayout::node(
            FlexOptions::row(),
            vec![rect().size(10.0, 10.0), spacer(25.0, 0.0), rect().size(10.0, 10.0)],
        );
        assert_eq!(resolve_bounds(&node, &ctx).width, 45.0);
    }
}
