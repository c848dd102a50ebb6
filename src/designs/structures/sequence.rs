use super::{Structure, StructureProps};
use crate::designs::components::{btn_add, btn_remove, btns_group, decor_group, items_group};
use crate::layout::PositionClass;
use crate::scene::{ElementRole, Point, SceneNode, group, polygon};

const ARROW_WIDTH: f32 = 20.0;
const ARROW_HEIGHT: f32 = 12.0;

/// Items in a row joined by arrows, add buttons above and remove buttons
/// below.
#[derive(Debug, Clone, Copy)]
pub struct SequenceSteps;

impl Structure for SequenceSteps {
    fn name(&self) -> &'static str {
        "sequence-steps"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let gap = props.layout.steps_gap;
        let btn = props.btn_bounds();
        let cell = props.item_bounds(props.first_item(PositionClass::Center));
        let top = (btn.height + 20.0).max(30.0);
        let add_y = top - btn.height - 10.0;
        let items = &props.data.items;

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut buttons = Vec::new();
        let mut arrows = Vec::new();
        for index in 0..items.len() {
            let x = index as f32 * (cell.width + gap);
            let item = props.item_props(vec![index])
                .at(x, top)
                .position(PositionClass::Center, PositionClass::Normal);
            item_nodes.push(props.item.render(&item));
            buttons.push(btn_remove(&[index]).at(x + (cell.width - btn.width) / 2.0, top + cell.height + 10.0));
            let add_x = if index == 0 {
                x + (cell.width - btn.width) / 2.0
            } else {
                x - gap / 2.0 - btn.width / 2.0
            };
            buttons.push(btn_add(&[index]).at(add_x, add_y));

            if index + 1 < items.len() {
                let arrow_x = x + cell.width + (gap - ARROW_WIDTH) / 2.0;
                let arrow_y = top + cell.height / 2.0 - ARROW_HEIGHT / 2.0;
                arrows.push(arrow(arrow_x, arrow_y));
            }
        }
        if !items.is_empty() {
            let last_x = (items.len() - 1) as f32 * (cell.width + gap);
            buttons.push(btn_add(&[items.len()]).at(last_x + cell.width + (gap - btn.width) / 2.0, add_y));
        }

        props.frame(
            group()
                .child(decor_group(arrows))
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}

/// Right-pointing chevron with its top-left corner at `(x, y)`.
fn arrow(x: f32, y: f32) -> SceneNode {
    let notch = ARROW_WIDTH - ARROW_HEIGHT / 2.0;
    polygon(vec![
        Point::new(x, y),
        Point::new(x + notch, y),
        Point::new(x + ARROW_WIDTH, y + ARROW_HEIGHT / 2.0),
        Point::new(x + notch, y + ARROW_HEIGHT),
        Point::new(x, y + ARROW_HEIGHT),
    ])
    .role(ElementRole::Decoration)
    .prop("fill", "#666")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bounds, LayoutContext, resolve_bounds};
    use crate::text_metrics::FixedMetrics;

    #[test]
    fn arrow_spans_its_box() {
        let metrics = FixedMetrics::default();
        let bounds = resolve_bounds(&arrow(10.0, 5.0), &LayoutContext::new(&metrics));
        assert_eq!(bounds, Bounds::new(10.0, 5.0, ARROW_WIDTH, ARROW_HEIGHT));
    }
}
