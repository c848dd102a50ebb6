//! Item designs: how a single datum is drawn.
//!
//! Every item renders the same fixed-size box regardless of its datum, so a
//! structure can probe the first item once and lay out the rest on a grid.

use super::components::{item_desc, item_icon, item_illus, item_label, item_value};
use crate::data::{Data, ItemDatum};
use crate::item::{ITEM_PREFIX, ItemPath, path_to_key};
use crate::layout::{AlignLayout, AlignOptions, FlexAlign, FlexLayout, FlexOptions, HAlign, PositionClass};
use crate::scene::{ElementRole, SceneNode, ellipse, group};
use crate::theme::ThemeColors;

#[derive(Debug, Clone, PartialEq)]
pub struct ItemProps<'a> {
    pub indexes: ItemPath,
    pub datum: Option<&'a ItemDatum>,
    pub data: &'a Data,
    pub colors: &'a ThemeColors,
    pub x: f32,
    pub y: f32,
    /// Overrides the design's default width.
    pub width: Option<f32>,
    pub position_h: PositionClass,
    pub position_v: PositionClass,
}

impl<'a> ItemProps<'a> {
    /// Props for the datum at `indexes`; a missing datum draws an empty item.
    pub fn new(indexes: ItemPath, data: &'a Data, colors: &'a ThemeColors) -> Self {
        Self {
            datum: data.datum(&indexes),
            indexes,
            data,
            colors,
            x: 0.0,
            y: 0.0,
            width: None,
            position_h: PositionClass::Normal,
            position_v: PositionClass::Normal,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn position(mut self, horizontal: PositionClass, vertical: PositionClass) -> Self {
        self.position_h = horizontal;
        self.position_v = vertical;
        self
    }

    /// Wraps the item body in its positioned, addressable container.
    fn frame(&self, body: SceneNode) -> SceneNode {
        group()
            .prop("id", format!("{ITEM_PREFIX}{}", path_to_key(&self.indexes)))
            .at(self.x, self.y)
            .child(body)
    }
}

pub trait ItemComponent: Send + Sync {
    fn name(&self) -> &'static str;
    fn render(&self, props: &ItemProps<'_>) -> SceneNode;
}

pub const ITEMS: [&str; 3] = ["simple", "icon-badge", "illus-card"];

pub fn item_by_name(name: &str) -> Option<&'static dyn ItemComponent> {
    match name {
        "simple" => Some(&SimpleItem),
        "icon-badge" => Some(&IconBadge),
        "illus-card" => Some(&IllusCard),
        _ => None,
    }
}

fn text_align(position: PositionClass) -> HAlign {
    match position {
        PositionClass::Normal => HAlign::Left,
        PositionClass::Center => HAlign::Center,
        PositionClass::Flipped => HAlign::Right,
    }
}

/// Icon next to a label and description. Centered items stack vertically;
/// flipped items put the icon on the right.
#[derive(Debug, Clone, Copy)]
pub struct SimpleItem;

const SIMPLE_WIDTH: f32 = 200.0;
const SIMPLE_ICON: f32 = 30.0;

impl ItemComponent for SimpleItem {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn render(&self, props: &ItemProps<'_>) -> SceneNode {
        let width = props.width.unwrap_or(SIMPLE_WIDTH);
        let path = &props.indexes;
        let align = text_align(props.position_h);
        let icon = item_icon(path, SIMPLE_ICON);

        if props.position_h == PositionClass::Center {
            let label = item_label(props, width, align);
            let desc = item_desc(props, width, align);
            let children = if props.position_v == PositionClass::Flipped {
                vec![label, desc, icon]
            } else {
                vec![icon, label, desc]
            };
            let options = FlexOptions::column().gap(8.0).align(FlexAlign::Center);
            return props.frame(FlexLayout::node(options, children));
        }

        let text_width = (width - SIMPLE_ICON - 10.0).max(0.0);
        let texts = FlexLayout::node(
            FlexOptions::column().gap(4.0),
            vec![
                item_label(props, text_width, align),
                item_desc(props, text_width, align),
            ],
        );
        let children = if props.position_h == PositionClass::Flipped {
            vec![texts, icon]
        } else {
            vec![icon, texts]
        };
        let options = FlexOptions::row().gap(10.0).align(FlexAlign::Start);
        props.frame(FlexLayout::node(options, children))
    }
}

/// Icon centered over a colored disc, with the value, label and description
/// below or beside it.
#[derive(Debug, Clone, Copy)]
pub struct IconBadge;

const BADGE_SIZE: f32 = 60.0;
const BADGE_ICON: f32 = 28.0;
const BADGE_TEXT_WIDTH: f32 = 140.0;

impl ItemComponent for IconBadge {
    fn name(&self) -> &'static str {
        "icon-badge"
    }

    fn render(&self, props: &ItemProps<'_>) -> SceneNode {
        let path = &props.indexes;
        let text_width = props.width.unwrap_or(BADGE_TEXT_WIDTH);
        let align = text_align(props.position_h);
        let badge = AlignLayout::node(
            AlignOptions::centered(),
            vec![
                ellipse()
                    .prop("id", crate::item::path_to_element_id("shape", path))
                    .role(ElementRole::Shape)
                    .indexes(path)
                    .size(BADGE_SIZE, BADGE_SIZE),
                item_icon(path, BADGE_ICON).prop("fill", props.colors.color_white.as_str()),
            ],
        );
        let texts = vec![
            item_value(props, text_width, align),
            item_label(props, text_width, align),
            item_desc(props, text_width, align),
        ];

        let body = match props.position_h {
            PositionClass::Center => {
                let mut children = vec![badge];
                children.extend(texts);
                FlexLayout::node(FlexOptions::column().gap(6.0).align(FlexAlign::Center), children)
            }
            horizontal => {
                let column = FlexLayout::node(FlexOptions::column().gap(2.0), texts);
                let children = if horizontal == PositionClass::Flipped {
                    vec![column, badge]
                } else {
                    vec![badge, column]
                };
                FlexLayout::node(FlexOptions::row().gap(12.0).align(FlexAlign::Center), children)
            }
        };
        props.frame(body)
    }
}

/// Illustration banner with the label and description underneath.
#[derive(Debug, Clone, Copy)]
pub struct IllusCard;

const CARD_WIDTH: f32 = 160.0;
const CARD_ILLUS_HEIGHT: f32 = 90.0;

impl ItemComponent for IllusCard {
    fn name(&self) -> &'static str {
        "illus-card"
    }

    fn render(&self, props: &ItemProps<'_>) -> SceneNode {
        let path = &props.indexes;
        let width = props.width.unwrap_or(CARD_WIDTH);
        let align = text_align(props.position_h);
        let banner = item_illus(path, width, CARD_ILLUS_HEIGHT);
        let label = item_label(props, width, align);
        let desc = item_desc(props, width, align);
        let children = if props.position_v == PositionClass::Flipped {
            vec![label, desc, banner]
        } else {
            vec![banner, label, desc]
        };
        props.frame(FlexLayout::node(FlexOptions::column().gap(6.0), children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bounds, LayoutContext, NodeKind, materialize, resolve_bounds};
    use crate::text_metrics::FixedMetrics;
    use crate::theme::ThemeConfig;

    fn bounds(node: &SceneNode) -> Bounds {
        let metrics = FixedMetrics::default();
        resolve_bounds(node, &LayoutContext::new(&metrics))
    }

    fn fills(node: &SceneNode, role: ElementRole) -> Vec<String> {
        let mut found = Vec::new();
        node.walk(&mut |n| {
            if n.element_role() == Some(role)
                && let Some(fill) = n.str_prop("fill")
            {
                found.push(fill.to_string());
            }
        });
        found
    }

    #[test]
    fn simple_item_size_does_not_depend_on_datum() {
        let colors = ThemeConfig::default().colors();
        let data = Data {
            items: vec![ItemDatum::labeled("A fairly long label for an item")],
            ..Data::default()
        };
        let empty = Data::default();
        let with = SimpleItem.render(&ItemProps::new(vec![0], &data, &colors));
        let without = SimpleItem.render(&ItemProps::new(vec![0], &empty, &colors));
        assert_eq!(bounds(&with), bounds(&without));
        assert_eq!(bounds(&with), Bounds::new(0.0, 0.0, SIMPLE_WIDTH, 70.0));
    }

    #[test]
    fn centered_simple_item_stacks() {
        let colors = ThemeConfig::default().colors();
        let data = Data::default();
        let props = ItemProps::new(vec![1], &data, &colors).position(PositionClass::Center, PositionClass::Normal);
        let node = SimpleItem.render(&props);
        assert_eq!(bounds(&node), Bounds::new(0.0, 0.0, SIMPLE_WIDTH, 30.0 + 8.0 + 26.0 + 8.0 + 40.0));
    }

    #[test]
    fn flipped_items_mirror_their_layout() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let colors = ThemeConfig::default().colors();
        let data = Data::default();
        let props = ItemProps::new(vec![0], &data, &colors).position(PositionClass::Flipped, PositionClass::Normal);
        let node = materialize(&IconBadge.render(&props), &ctx);
        let mut shapes = Vec::new();
        node.walk(&mut |n| {
            if n.kind == NodeKind::Ellipse {
                shapes.push(n.clone());
            }
        });
        assert_eq!(shapes.len(), 1);
        let normal = materialize(&IconBadge.render(&ItemProps::new(vec![0], &data, &colors)), &ctx);
        assert_eq!(bounds(&node).width, bounds(&normal).width);
        assert_ne!(node, normal);
    }

    #[test]
    fn items_are_positioned_and_addressed() {
        let colors = ThemeConfig::default().colors();
        let data = Data::default();
        let node = IllusCard.render(&ItemProps::new(vec![0, 2], &data, &colors).at(30.0, 40.0));
        assert_eq!(node.id(), Some("item-1_3"));
        let b = bounds(&node);
        assert_eq!((b.x, b.y, b.width), (30.0, 40.0, CARD_WIDTH));
        assert!(item_by_name("icon-badge").is_some());
        assert!(item_by_name("missing").is_none());
    }

    #[test]
    fn dark_background_gives_light_text() {
        let theme = ThemeConfig {
            color_bg: Some("#000000".into()),
            ..ThemeConfig::default()
        };
        let colors = theme.colors();
        assert!(colors.is_dark_mode);
        let data = Data {
            items: vec![ItemDatum::labeled("Night")],
            ..Data::default()
        };
        let props = ItemProps::new(vec![0], &data, &colors);
        for design in [&SimpleItem as &dyn ItemComponent, &IconBadge, &IllusCard] {
            let node = design.render(&props);
            assert_eq!(fills(&node, ElementRole::ItemLabel), vec!["#FFFFFF".to_string()]);
            let desc = fills(&node, ElementRole::ItemDesc);
            assert_eq!(desc, vec![colors.color_text_secondary.clone()]);
            assert!(!crate::theme::is_dark_color(&desc[0]));
        }
        let badge = IconBadge.render(&props);
        assert_eq!(fills(&badge, ElementRole::ItemIcon), vec![colors.color_white.clone()]);
    }
}
