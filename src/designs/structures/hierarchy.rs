use super::{Structure, StructureProps, empty_add_button};
use crate::designs::components::{btn_add, btn_remove, btns_group, decor_group, items_group};
use crate::layout::PositionClass;
use crate::layout::tree::{TreeOptions, build_hierarchy, layout_tree};
use crate::scene::{ElementRole, SceneNode, group, path};
use tracing::debug;

/// Top-down tidy tree with elbow connectors.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyTree;

impl Structure for HierarchyTree {
    fn name(&self) -> &'static str {
        "hierarchy-tree"
    }

    fn render(&self, props: &StructureProps<'_>) -> SceneNode {
        let Some(root) = build_hierarchy(&props.data.items) else {
            return props.frame(group().child(btns_group(vec![empty_add_button()])));
        };
        let btn = props.btn_bounds();
        let cell = props.item_bounds(props.first_item(PositionClass::Normal));
        let options = TreeOptions {
            item_width: cell.width,
            item_height: cell.height,
            node_gap: props.layout.node_gap,
            level_gap: props.layout.level_gap,
            btn_width: btn.width,
            btn_height: btn.height,
        };
        let tree = layout_tree(&root, &options);
        debug!(nodes = tree.nodes.len(), slots = tree.add_slots.len(), "tree laid out");

        let mut item_nodes = Vec::with_capacity(tree.nodes.len());
        let mut buttons = Vec::new();
        for node in &tree.nodes {
            let item = props.item_props(node.path.clone()).at(node.x, node.y);
            item_nodes.push(props.item.render(&item));
            buttons.push(btn_remove(&node.path).at(
                node.x + (cell.width - btn.width) / 2.0,
                node.y + cell.height + 5.0,
            ));
        }
        buttons.extend(tree.add_slots.iter().map(|slot| btn_add(&slot.path).at(slot.x, slot.y)));

        let connectors = tree
            .connectors
            .iter()
            .map(|connector| {
                path(connector.path_data())
                    .role(ElementRole::Decoration)
                    .prop("stroke", props.layout.connector_color.as_str())
                    .prop("stroke-width", 2.0)
                    .prop("fill", "none")
            })
            .collect();

        props.frame(
            group()
                .child(decor_group(connectors))
                .child(items_group(item_nodes))
                .child(btns_group(buttons)),
        )
    }
}
