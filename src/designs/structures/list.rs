use super::{Structure, StructureProps};
use crate::designs::components::{btn_add, btn_remove, btns_group, items_group};
use crate::layout::PositionClass;
use crate::scene::{SceneNode, group, resolve_bounds};

/// Items in a single row, buttons underneath.
#[derive(Debug, Clone, Copy)]
pub struct ListRow;

impl Structure for ListRow {
    fn name(&self) -> &'static str {
        "list-row"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let gap = props.layout.gap;
        let btn = props.btn_bounds();
        let cell = props.item_bounds(props.first_item(PositionClass::Center));
        let btn_y = cell.height;
        let items = &props.data.items;

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut buttons = Vec::new();
        for index in 0..items.len() {
            let x = (cell.width + gap) * index as f32;
            let item = props.item_props(vec![index])
                .at(x, 0.0)
                .position(PositionClass::Center, PositionClass::Normal);
            item_nodes.push(props.item.render(&item));
            buttons.push(btn_remove(&[index]).at(x + (cell.width - btn.width) / 2.0, btn_y));
            buttons.push(btn_add(&[index]).at(x - (gap + btn.width) / 2.0, btn_y));
        }
        if !items.is_empty() {
            let last_x = (cell.width + gap) * (items.len() - 1) as f32;
            buttons.push(btn_add(&[items.len()]).at(last_x + cell.width + (gap - btn.width) / 2.0, btn_y));
        }

        props.frame(
            group()
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}

/// Items stacked in a column as wide as the title.
#[derive(Debug, Clone, Copy)]
pub struct ListColumn;

impl Structure for ListColumn {
    fn name(&self) -> &'static str {
        "list-column"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let gap = props.layout.gap;
        let width = match props.title() {
            Some(title) => resolve_bounds(&title, &props.ctx).width * 0.8,
            None => props.layout.title_width,
        };
        let btn = props.btn_bounds();
        let cell = props.item_bounds(
            props
                .first_item(PositionClass::Normal)
                .width(width)
                .position(PositionClass::Normal, PositionClass::Center),
        );
        let items = &props.data.items;
        let add_x = (width - btn.width) / 2.0;

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut buttons = Vec::new();
        for index in 0..items.len() {
            let y = (cell.height + gap) * index as f32;
            let item = props.item_props(vec![index])
                .at(0.0, y)
                .width(width)
                .position(PositionClass::Normal, PositionClass::Center);
            item_nodes.push(props.item.render(&item));
            buttons.push(btn_remove(&[index]).at(-btn.width - 10.0, y + (cell.height - btn.height) / 2.0));
            buttons.push(btn_add(&[index]).at(add_x, y - btn.height));
        }
        if !items.is_empty() {
            let last_y = (cell.height + gap) * (items.len() - 1) as f32;
            buttons.push(btn_add(&[items.len()]).at(add_x, last_y + cell.height));
        }

        props.frame(
            group()
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}

/// Items on a fixed-column grid.
#[derive(Debug, Clone, Copy)]
pub struct ListGrid;

impl Structure for ListGrid {
    fn name(&self) -> &'static str {
        "list-grid"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let gap = props.layout.gap;
        let columns = props.layout.columns.max(1);
        let btn = props.btn_bounds();
        let cell = props.item_bounds(props.first_item(PositionClass::Center));
        let items = &props.data.items;
        let row_height = cell.height + gap;
        let col_width = cell.width + gap;
        let side_y = (cell.height - btn.height) / 2.0;

        let mut item_nodes = Vec::with_capacity(items.len());
        let mut buttons = Vec::new();
        for index in 0..items.len() {
            let (row, col) = (index / columns, index % columns);
            let x = col as f32 * col_width;
            let y = row as f32 * row_height;
            let item = props.item_props(vec![index])
                .at(x, y)
                .position(PositionClass::Center, PositionClass::Normal);
            item_nodes.push(props.item.render(&item));
            buttons.push(btn_remove(&[index]).at(x + (cell.width - btn.width) / 2.0, y + cell.height));
            if col == 0 {
                buttons.push(btn_add(&[index]).at(x - gap / 2.0 - btn.width / 2.0, y + side_y));
            }
            // One slot to the right of every item covers both the gaps
            // between neighbours and the end of each row.
            buttons.push(btn_add(&[index + 1]).at(x + cell.width + (gap - btn.width) / 2.0, y + side_y));
        }

        props.frame(
            group()
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::data::{Data, ItemDatum};
    use crate::designs::items::SimpleItem;
    use crate::scene::{ElementRole, LayoutContext};
    use crate::text_metrics::FixedMetrics;
    use crate::theme::ThemeConfig;

    fn data(count: usize) -> Data {
        Data {
            items: (0..count).map(|i| ItemDatum::labeled(&format!("Item {i}"))).collect(),
            ..Data::default()
        }
    }

    fn count_role(node: &SceneNode, role: ElementRole) -> usize {
        let mut count = 0;
        node.walk(&mut |n| {
            if n.element_role() == Some(role) {
                count += 1;
            }
        });
        count
    }

    fn render(structure: &dyn Structure, data: &Data, layout: &LayoutConfig) -> SceneNode {
        let metrics = FixedMetrics::default();
        let colors = ThemeConfig::default().colors();
        let props = StructureProps {
            data,
            item: &SimpleItem,
            layout,
            colors: &colors,
            ctx: LayoutContext::new(&metrics),
        };
        structure.render(&props)
    }

    #[test]
    fn grid_adds_one_button_per_gap_and_row_start() {
        let layout = LayoutConfig {
            columns: 3,
            ..LayoutConfig::default()
        };
        let node = render(&ListGrid, &data(5), &layout);
        assert_eq!(count_role(&node, ElementRole::BtnRemove), 5);
        // five trailing slots plus the start of two rows
        assert_eq!(count_role(&node, ElementRole::BtnAdd), 7);
    }

    #[test]
    fn column_adds_between_and_after_items() {
        let node = render(&ListColumn, &data(3), &LayoutConfig::default());
        assert_eq!(count_role(&node, ElementRole::BtnAdd), 4);
        assert_eq!(count_role(&node, ElementRole::ItemLabel), 3);
    }
}
