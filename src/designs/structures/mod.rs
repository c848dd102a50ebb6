//! Structures arrange items, buttons and decorations into a whole graphic.

mod hierarchy;
mod list;
mod relation;
mod sequence;

pub use hierarchy::HierarchyTree;
pub use list::{ListColumn, ListGrid, ListRow};
pub use relation::{RelationCircle, RelationNetwork};
pub use sequence::SequenceSteps;

use super::components::{BTN_SIZE, btn_add, title};
use super::items::{ItemComponent, ItemProps};
use crate::config::LayoutConfig;
use crate::data::Data;
use crate::layout::{FlexAlign, FlexLayout, FlexOptions, PositionClass};
use crate::item::ItemPath;
use crate::scene::{Bounds, LayoutContext, SceneNode, resolve_bounds};
use crate::theme::ThemeColors;

/// Inputs shared by every structure.
pub struct StructureProps<'a> {
    pub data: &'a Data,
    pub item: &'a dyn ItemComponent,
    pub layout: &'a LayoutConfig,
    /// Derived once per composition and handed to every item.
    pub colors: &'a ThemeColors,
    pub ctx: LayoutContext<'a>,
}

impl StructureProps<'_> {
    fn item_props(&self, indexes: ItemPath) -> ItemProps<'_> {
        ItemProps::new(indexes, self.data, self.colors)
    }

    /// Box of the first item, used as the cell size for every item.
    fn item_bounds(&self, probe: ItemProps<'_>) -> Bounds {
        resolve_bounds(&self.item.render(&probe), &self.ctx)
    }

    fn first_item(&self, position_h: PositionClass) -> ItemProps<'_> {
        self.item_props(vec![0]).position(position_h, PositionClass::Normal)
    }

    fn btn_bounds(&self) -> Bounds {
        resolve_bounds(&btn_add(&[0]), &self.ctx)
    }

    fn title(&self) -> Option<SceneNode> {
        title(self.data, self.colors, self.layout.title_width)
    }

    /// Title block above the structure body, centered in a column.
    fn frame(&self, body: SceneNode) -> SceneNode {
        let children = self.title().into_iter().chain(std::iter::once(body)).collect();
        let options = FlexOptions::column()
            .justify(FlexAlign::Center)
            .align(FlexAlign::Center);
        FlexLayout::node(options, children).prop("id", "infographic-container")
    }
}

pub trait Structure: Send + Sync {
    fn name(&self) -> &'static str;
    fn render(&self, props: &StructureProps<'_>) -> SceneNode;
}

pub const STRUCTURES: [&str; 7] = [
    "list-row",
    "list-column",
    "list-grid",
    "sequence-steps",
    "hierarchy-tree",
    "relation-circle",
    "relation-network",
];

pub fn structure_by_name(name: &str) -> Option<&'static dyn Structure> {
    match name {
        "list-row" => Some(&ListRow),
        "list-column" => Some(&ListColumn),
        "list-grid" => Some(&ListGrid),
        "sequence-steps" => Some(&SequenceSteps),
        "hierarchy-tree" => Some(&HierarchyTree),
        "relation-circle" => Some(&RelationCircle),
        "relation-network" => Some(&RelationNetwork),
        _ => None,
    }
}

/// A lone "add" button centered on the origin, shown when there are no items.
fn empty_add_button() -> SceneNode {
    btn_add(&[0]).at(-BTN_SIZE / 2.0, -BTN_SIZE / 2.0)
}
