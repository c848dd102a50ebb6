//! Building blocks shared by items and structures.

use super::items::ItemProps;
use crate::data::Data;
use crate::item::{btn_add_id, btn_remove_id, path_to_element_id};
use crate::layout::{FlexAlign, FlexLayout, FlexOptions, HAlign};
use crate::render::svg::H_ALIGN_KEY;
use crate::scene::{ElementRole, SceneNode, group, icon, illus, rect, text};
use crate::theme::ThemeColors;

pub const BTN_SIZE: f32 = 20.0;
pub const LABEL_HEIGHT: f32 = 26.0;
pub const DESC_HEIGHT: f32 = 40.0;
pub const VALUE_HEIGHT: f32 = 24.0;
pub const TITLE_HEIGHT: f32 = 32.0;
const TITLE_GAP: f32 = 8.0;
const DESC_LINES: f32 = 2.0;
pub const TITLE_ILLUS_ID: &str = "title-illus";
const TITLE_ILLUS_SIZE: f32 = 120.0;

pub fn btn_add(path: &[usize]) -> SceneNode {
    rect()
        .prop("id", btn_add_id(path))
        .role(ElementRole::BtnAdd)
        .indexes(path)
        .prop("fill", "#B9EBCA")
        .prop("fill-opacity", 0.3)
        .size(BTN_SIZE, BTN_SIZE)
}

pub fn btn_remove(path: &[usize]) -> SceneNode {
    rect()
        .prop("id", btn_remove_id(path))
        .role(ElementRole::BtnRemove)
        .indexes(path)
        .prop("fill", "#F9C0C0")
        .prop("fill-opacity", 0.3)
        .size(BTN_SIZE, BTN_SIZE)
}

pub fn btns_group(buttons: Vec<SceneNode>) -> SceneNode {
    group()
        .prop("id", "btns-group")
        .role(ElementRole::BtnsGroup)
        .with_children(buttons)
}

pub fn items_group(items: Vec<SceneNode>) -> SceneNode {
    group()
        .prop("id", "items-group")
        .role(ElementRole::ItemsGroup)
        .with_children(items)
}

/// Non-data drawing such as connectors and arrows.
pub fn decor_group(decorations: Vec<SceneNode>) -> SceneNode {
    group().with_children(decorations)
}

fn item_text(role: ElementRole, suffix: &str, path: &[usize], content: Option<String>) -> SceneNode {
    text(content.unwrap_or_default())
        .prop("id", path_to_element_id(suffix, path))
        .role(role)
        .indexes(path)
        .prop("line-height", 1.4)
}

pub fn item_label(props: &ItemProps<'_>, width: f32, align: HAlign) -> SceneNode {
    let label = props.datum.and_then(|d| d.label.clone());
    item_text(ElementRole::ItemLabel, "label", &props.indexes, label)
        .prop("font-size", 18.0)
        .prop("font-weight", "bold")
        .prop("fill", props.colors.color_text.as_str())
        .prop(H_ALIGN_KEY, align.as_str())
        .size(width, LABEL_HEIGHT)
}

pub fn item_desc(props: &ItemProps<'_>, width: f32, align: HAlign) -> SceneNode {
    let desc = props.datum.and_then(|d| d.desc.clone());
    item_text(ElementRole::ItemDesc, "desc", &props.indexes, desc)
        .prop("font-size", 14.0)
        .prop("fill", props.colors.color_text_secondary.as_str())
        .prop("word-wrap", true)
        .prop(H_ALIGN_KEY, align.as_str())
        .size(width, DESC_HEIGHT)
}

pub fn item_value(props: &ItemProps<'_>, width: f32, align: HAlign) -> SceneNode {
    let value = props.datum.and_then(|d| d.value.as_ref()).map(|value| value.format());
    item_text(ElementRole::ItemValue, "value", &props.indexes, value)
        .prop("font-size", 16.0)
        .prop("font-weight", "bold")
        .prop("fill", props.colors.color_primary.as_str())
        .prop(H_ALIGN_KEY, align.as_str())
        .size(width, VALUE_HEIGHT)
}

pub fn item_icon(path: &[usize], size: f32) -> SceneNode {
    icon()
        .prop("id", path_to_element_id("icon", path))
        .role(ElementRole::ItemIcon)
        .indexes(path)
        .size(size, size)
}

pub fn item_illus(path: &[usize], width: f32, height: f32) -> SceneNode {
    illus()
        .prop("id", path_to_element_id("illus", path))
        .role(ElementRole::ItemIllus)
        .indexes(path)
        .size(width, height)
}

/// Document-level illustration slot, resolved from `data.illus[id]`.
pub fn illus_slot(id: &str, width: f32, height: f32) -> SceneNode {
    illus().prop("id", id).role(ElementRole::Illus).size(width, height)
}

/// Title and subtitle stacked in a column, or nothing when the dataset has
/// neither. A `title-illus` entry in `data.illus` adds a banner slot on top.
pub fn title(data: &Data, colors: &ThemeColors, width: f32) -> Option<SceneNode> {
    let mut children = Vec::new();
    if data.illus.contains_key(TITLE_ILLUS_ID) {
        children.push(illus_slot(TITLE_ILLUS_ID, TITLE_ILLUS_SIZE, TITLE_ILLUS_SIZE));
    }
    if let Some(title) = &data.title {
        children.push(
            text(title.clone())
                .prop("id", "title")
                .role(ElementRole::Title)
                .prop("font-size", 24.0)
                .prop("fill", colors.color_text.as_str())
                .prop("line-height", 1.4)
                .prop(H_ALIGN_KEY, HAlign::Center.as_str())
                .size(width, TITLE_HEIGHT),
        );
    }
    if let Some(desc) = &data.desc {
        children.push(
            text(desc.clone())
                .prop("id", "desc")
                .role(ElementRole::Desc)
                .prop("font-size", 16.0)
                .prop("fill", colors.color_text_secondary.as_str())
                .prop("line-height", 1.4)
                .prop(H_ALIGN_KEY, HAlign::Center.as_str())
                .size(width, DESC_LINES * 24.0),
        );
    }
    if children.is_empty() {
        return None;
    }
    let options = FlexOptions {
        width: Some(width),
        ..FlexOptions::column().gap(TITLE_GAP).align(FlexAlign::Center)
    };
    Some(FlexLayout::node(options, children).prop("id", "title-group"))
}
