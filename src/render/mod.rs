//! Template renderer.
//!
//! A template is a [`Document`] whose nodes carry role tags. Rendering walks
//! the tree once in document order and reconciles every tagged node with the
//! dataset and theme: text is substituted, icons and illustrations are
//! resolved, themed attributes are applied, and nodes whose data is missing
//! are dropped. Fitting the frame to the content is a separate step, see
//! [`attach_and_fit`].

mod fit;
pub mod svg;

pub use fit::{DetachedSurface, HostSurface, StaticSurface, attach_and_fit};
pub use svg::{escape_xml, to_svg, to_svg_with, write_output_svg};

#[cfg(feature = "png")]
pub use svg::write_output_png;

use crate::config::{Config, LayoutConfig, Length, RenderConfig, ViewBox};
use crate::data::{Data, datum_by_path};
use crate::error::{RenderError, Result};
use crate::item::ItemPath;
use crate::scene::{ElementRole, INDEXES_KEY, NodeKind, Props, ROLE_KEY, SceneNode, TEXT_KEY, group, tagged_path};
use crate::theme::{DynamicAttributes, ThemeConfig, attrs::literal_rules, resolve_attributes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Icon,
    Illus,
}

/// External resource referenced by the rendered document. Loading is left to
/// the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub href: String,
}

/// Root of a rendered or authored graphic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub root: SceneNode,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub view_box: Option<ViewBox>,
    pub id: Option<String>,
    pub class: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(group())
    }
}

impl Document {
    pub fn new(root: SceneNode) -> Self {
        Self {
            root,
            width: None,
            height: None,
            view_box: None,
            id: None,
            class: Vec::new(),
            attributes: BTreeMap::new(),
            background: None,
            resources: Vec::new(),
        }
    }

    pub fn from_json5(source: &str) -> Result<Self> {
        json5::from_str(source).map_err(|err| RenderError::Template(err.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| RenderError::Template(err.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfographicOptions {
    pub data: Data,
    pub theme: ThemeConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl InfographicOptions {
    pub fn new(data: Data, config: Config) -> Self {
        Self {
            data,
            theme: config.theme,
            layout: config.layout,
            render: config.render,
        }
    }
}

/// Reconciliation of one template slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Keep,
    Remove,
    Replace(SceneNode),
}

/// Applies `patch` to `slot`. Returns whether the slot changed; replacing a
/// node with a structurally equal one is not a change.
pub fn upsert(slot: &mut Option<SceneNode>, patch: Patch) -> bool {
    match patch {
        Patch::Keep => false,
        Patch::Remove => slot.take().is_some(),
        Patch::Replace(node) => {
            if slot.as_ref() == Some(&node) {
                return false;
            }
            *slot = Some(node);
            true
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Unrendered,
    Rendered,
}

/// One-shot renderer over a template. Each logical render needs a fresh
/// instance.
#[derive(Debug)]
pub struct Renderer {
    options: InfographicOptions,
    template: Document,
    state: RenderState,
}

impl Renderer {
    pub fn new(options: InfographicOptions, template: Document) -> Self {
        Self {
            options,
            template,
            state: RenderState::Unrendered,
        }
    }

    pub fn options(&self) -> &InfographicOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.template
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn render(&mut self) -> Result<&Document> {
        if self.state == RenderState::Rendered {
            warn!("render requested twice on the same renderer");
            return Err(RenderError::AlreadyRendered);
        }
        render_template(&mut self.template, &self.options);
        self.state = RenderState::Rendered;
        Ok(&self.template)
    }

    pub fn into_document(self) -> Document {
        self.template
    }
}

fn render_template(document: &mut Document, options: &InfographicOptions) {
    let filler = Filler::new(options);
    filler.fill(&mut document.root);
    set_svg(document, &options.render);
    if let Some(color) = &options.theme.color_bg {
        document.background = Some(color.clone());
    }
    if let Some(stylize) = &options.theme.stylize {
        stylize.apply(&mut document.root);
    }
    document.resources = collect_resources(&document.root);
    debug!(
        changed = filler.changed.get(),
        resources = document.resources.len(),
        "template rendered"
    );
}

fn set_svg(document: &mut Document, config: &RenderConfig) {
    if let Some(id) = &config.id {
        document.id = Some(id.clone());
    }
    if let Some(class) = &config.class_name
        && !document.class.contains(class)
    {
        document.class.push(class.clone());
    }
    if let Some(width) = &config.width {
        document.width = Some(width.clone());
    }
    if let Some(height) = &config.height {
        document.height = Some(height.clone());
    }
    document
        .attributes
        .extend(config.attributes.iter().map(|(key, value)| (key.clone(), value.clone())));
}

/// Icon and illustration references in document order, without duplicates.
pub fn collect_resources(root: &SceneNode) -> Vec<Resource> {
    let mut resources: Vec<Resource> = Vec::new();
    root.walk(&mut |node| {
        let kind = match node.kind {
            NodeKind::Icon => ResourceKind::Icon,
            NodeKind::Illus => ResourceKind::Illus,
            _ => return,
        };
        let Some(href) = node.str_prop("href") else {
            return;
        };
        let resource = Resource {
            kind,
            href: href.to_string(),
        };
        if !resources.contains(&resource) {
            resources.push(resource);
        }
    });
    resources
}

const ICON_KEEP: [&str; 9] = [ROLE_KEY, INDEXES_KEY, "id", "x", "y", "width", "height", "fill", "stroke"];
const ILLUS_KEEP: [&str; 8] = [ROLE_KEY, INDEXES_KEY, "id", "x", "y", "width", "height", "clip-path"];

#[derive(Clone, Copy)]
enum ItemText {
    Label,
    Desc,
    Value,
}

struct Filler<'a> {
    options: &'a InfographicOptions,
    total: usize,
    changed: std::cell::Cell<usize>,
}

impl<'a> Filler<'a> {
    fn new(options: &'a InfographicOptions) -> Self {
        Self {
            options,
            total: options.data.items.len(),
            changed: std::cell::Cell::new(0),
        }
    }

    fn theme(&self) -> &ThemeConfig {
        &self.options.theme
    }

    fn fill(&self, root: &mut SceneNode) {
        let global = &self.theme().base.global;
        if !global.is_empty() {
            root.walk_mut(&mut |node| {
                let attrs = resolve_attributes(node, global);
                node.props.extend(attrs);
            });
        }
        self.fill_children(root);
    }

    fn fill_children(&self, parent: &mut SceneNode) {
        let children = std::mem::take(&mut parent.children);
        parent.children = children
            .into_iter()
            .filter_map(|child| self.fill_node(child))
            .collect();
    }

    fn fill_node(&self, mut node: SceneNode) -> Option<SceneNode> {
        let Some(role) = node.element_role() else {
            self.fill_children(&mut node);
            return Some(node);
        };
        let patch = self.patch(role, &node);
        trace!(role = role.as_str(), ?patch, "fill");
        let descend = patch == Patch::Keep
            && !matches!(role, ElementRole::ShapesGroup | ElementRole::BtnsGroup);
        let mut slot = Some(node);
        if upsert(&mut slot, patch) {
            self.changed.set(self.changed.get() + 1);
        }
        if descend && let Some(node) = slot.as_mut() {
            self.fill_children(node);
        }
        slot
    }

    fn patch(&self, role: ElementRole, node: &SceneNode) -> Patch {
        let data = &self.options.data;
        match role {
            ElementRole::Title => {
                let attrs = merged(&self.theme().base.text, &self.theme().title);
                text_patch(node, data.title.clone(), attrs)
            }
            ElementRole::Desc => {
                let attrs = merged(&self.theme().base.text, &self.theme().desc);
                text_patch(node, data.desc.clone(), attrs)
            }
            ElementRole::Illus => {
                let href = node.id().and_then(|id| data.illus.get(id)).cloned();
                resource_patch(node, NodeKind::Illus, &ILLUS_KEEP, href, Props::new())
            }
            ElementRole::ShapesGroup => {
                let mut shapes = node.clone();
                shapes.children = node.children.iter().map(|child| self.shape(child)).collect();
                Patch::Replace(shapes)
            }
            ElementRole::Shape => Patch::Replace(self.shape(node)),
            ElementRole::BtnsGroup | ElementRole::BtnAdd | ElementRole::BtnRemove => {
                if self.options.render.show_buttons {
                    Patch::Keep
                } else {
                    Patch::Remove
                }
            }
            ElementRole::ItemLabel => self.item_text(node, ItemText::Label),
            ElementRole::ItemDesc => self.item_text(node, ItemText::Desc),
            ElementRole::ItemValue => self.item_text(node, ItemText::Value),
            ElementRole::ItemIcon => {
                let href = self.item_path(node).and_then(|path| datum_by_path(data, &path)?.icon.clone());
                let attrs = resolve_attributes(node, &self.theme().item.icon);
                resource_patch(node, NodeKind::Icon, &ICON_KEEP, href, attrs)
            }
            ElementRole::ItemIllus => {
                let href = self.item_path(node).and_then(|path| datum_by_path(data, &path)?.illus.clone());
                resource_patch(node, NodeKind::Illus, &ILLUS_KEEP, href, Props::new())
            }
            ElementRole::Text => {
                let mut text = node.clone();
                text.props.extend(self.theme().base.text.clone());
                Patch::Replace(text)
            }
            _ if node.is_group() => Patch::Keep,
            _ => {
                let mut shape = node.clone();
                shape.props.extend(self.theme().base.shape.clone());
                Patch::Replace(shape)
            }
        }
    }

    fn item_path(&self, node: &SceneNode) -> Option<ItemPath> {
        match tagged_path(node)? {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(%err, "item-scoped node with an unreadable path; dropping it");
                None
            }
        }
    }

    fn item_text(&self, node: &SceneNode, kind: ItemText) -> Patch {
        let item = &self.theme().item;
        let datum = self
            .item_path(node)
            .and_then(|path| datum_by_path(&self.options.data, &path));
        let (content, rules) = match kind {
            ItemText::Label => (datum.and_then(|d| d.label.clone()), &item.label),
            ItemText::Desc => (datum.and_then(|d| d.desc.clone()), &item.desc),
            ItemText::Value => (datum.and_then(|d| d.value.as_ref().map(|v| v.format())), &item.value),
        };
        let mut attrs = self.theme().base.text.clone();
        attrs.extend(resolve_attributes(node, rules));
        text_patch(node, content, attrs)
    }

    /// Themed shape: palette color for item-scoped shapes, primary color
    /// otherwise, then the configured shape attributes.
    fn shape(&self, node: &SceneNode) -> SceneNode {
        let theme = self.theme();
        let mut rules: DynamicAttributes = literal_rules(&theme.base.shape);
        rules.extend(theme.item.shape.clone());
        let attrs = resolve_attributes(node, &rules);
        let mut shape = node.clone();
        if !attrs.contains_key("fill") {
            let color = match tagged_path(node) {
                Some(Ok(path)) => theme.item_color(&path, self.total),
                _ => theme.color_primary().to_string(),
            };
            shape.props.insert("fill".into(), color.into());
        }
        shape.props.extend(attrs);
        shape
    }
}

fn merged(base: &Props, overrides: &Props) -> Props {
    let mut props = base.clone();
    props.extend(overrides.iter().map(|(key, value)| (key.clone(), value.clone())));
    props
}

fn text_patch(node: &SceneNode, content: Option<String>, attrs: Props) -> Patch {
    match content {
        Some(content) if !content.is_empty() => {
            let mut text = node.clone();
            text.props.extend(attrs);
            text.props.insert(TEXT_KEY.into(), content.into());
            Patch::Replace(text)
        }
        _ => Patch::Remove,
    }
}

fn resource_patch(
    node: &SceneNode,
    kind: NodeKind,
    keep: &[&str],
    href: Option<String>,
    attrs: Props,
) -> Patch {
    let Some(href) = href.filter(|href| !href.is_empty()) else {
        return Patch::Remove;
    };
    let mut resource = SceneNode::new(kind.clone());
    for key in keep {
        if let Some(value) = node.get(key) {
            resource.props.insert(key.to_string(), value.clone());
        }
    }
    resource.props.extend(attrs);
    resource.props.insert("href".into(), href.into());
    if kind == NodeKind::Icon {
        let color = resource
            .str_prop("fill")
            .or_else(|| resource.str_prop("stroke"))
            .unwrap_or("currentColor")
            .to_string();
        resource.props.insert("color".into(), color.into());
    }
    Patch::Replace(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ItemDatum;
    use crate::scene::{Value, icon, rect, text};
    use crate::theme::{DynamicAttr, StylizeHook};

    fn options() -> InfographicOptions {
        let mut first = ItemDatum::labeled("Alpha");
        first.icon = Some("icon:star".into());
        first.value = Some(crate::data::DatumValue::Number(42.0));
        InfographicOptions {
            data: Data {
                title: Some("Quarterly".into()),
                items: vec![first, ItemDatum::labeled("Beta")],
                ..Data::default()
            },
            ..InfographicOptions::default()
        }
    }

    fn template() -> Document {
        Document::new(
            group()
                .child(text("placeholder").role(ElementRole::Title))
                .child(text("placeholder").role(ElementRole::Desc))
                .child(
                    group()
                        .role(ElementRole::ItemsGroup)
                        .child(text("").role(ElementRole::ItemLabel).indexes(&[0]))
                        .child(text("").role(ElementRole::ItemLabel).indexes(&[1]))
                        .child(text("").role(ElementRole::ItemValue).indexes(&[0]))
                        .child(icon().size(24.0, 24.0).role(ElementRole::ItemIcon).indexes(&[0]))
                        .child(icon().size(24.0, 24.0).role(ElementRole::ItemIcon).indexes(&[1]))
                        .child(rect().size(10.0, 10.0).role(ElementRole::Shape).indexes(&[1])),
                )
                .child(
                    group()
                        .role(ElementRole::BtnsGroup)
                        .child(rect().role(ElementRole::BtnAdd)),
                ),
        )
    }

    fn texts(document: &Document) -> Vec<String> {
        let mut out = Vec::new();
        document.root.walk(&mut |node| {
            if node.kind == NodeKind::Text {
                out.push(node.text().to_string());
            }
        });
        out
    }

    #[test]
    fn substitutes_and_removes() {
        let mut renderer = Renderer::new(options(), template());
        let document = renderer.render().expect("render").clone();
        assert_eq!(texts(&document), vec!["Quarterly", "Alpha", "Beta", "42"]);
        let items = &document.root.children[1];
        let icons: Vec<_> = items.children.iter().filter(|n| n.kind == NodeKind::Icon).collect();
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].str_prop("href"), Some("icon:star"));
        assert_eq!(document.root.children.len(), 2, "desc and buttons are removed");
        assert_eq!(
            document.resources,
            vec![Resource {
                kind: ResourceKind::Icon,
                href: "icon:star".into()
            }]
        );
    }

    #[test]
    fn second_render_is_rejected() {
        let mut renderer = Renderer::new(options(), template());
        renderer.render().expect("first render");
        assert!(matches!(renderer.render(), Err(RenderError::AlreadyRendered)));
        assert_eq!(renderer.state(), RenderState::Rendered);
    }

    #[test]
    fn rendering_a_rendered_template_changes_nothing() {
        let mut first = Renderer::new(options(), template());
        let once = first.render().expect("render").clone();
        let mut second = Renderer::new(options(), once.clone());
        let twice = second.render().expect("render").clone();
        assert_eq!(once, twice);
    }

    #[test]
    fn shapes_take_palette_colors() {
        let mut opts = options();
        opts.theme.palette = crate::theme::Palette::Colors(vec!["#111111".into(), "#222222".into()]);
        let mut renderer = Renderer::new(opts, template());
        let document = renderer.render().expect("render");
        let shape = document.root.children[1]
            .children
            .iter()
            .find(|node| node.kind == NodeKind::Rect)
            .expect("shape");
        assert_eq!(shape.str_prop("fill"), Some("#222222"));
    }

    #[test]
    fn theme_rules_and_buttons() {
        let mut opts = options();
        opts.render.show_buttons = true;
        opts.theme
            .item
            .label
            .insert("fill".into(), DynamicAttr::from("#123456"));
        opts.theme.stylize = Some(StylizeHook::new(|root| {
            root.props.insert("filter".into(), Value::from("url(#rough)"));
        }));
        let mut renderer = Renderer::new(opts, template());
        let document = renderer.render().expect("render");
        assert_eq!(document.root.children.len(), 3);
        assert_eq!(document.root.str_prop("filter"), Some("url(#rough)"));
        let label = &document.root.children[1].children[0];
        assert_eq!(label.str_prop("fill"), Some("#123456"));
    }

    #[test]
    fn upsert_semantics() {
        let node = rect().size(1.0, 1.0);
        let mut slot = Some(node.clone());
        assert!(!upsert(&mut slot, Patch::Replace(node.clone())));
        assert!(!upsert(&mut slot, Patch::Keep));
        assert!(upsert(&mut slot, Patch::Replace(rect())));
        assert!(upsert(&mut slot, Patch::Remove));
        assert_eq!(slot, None);
    }

    #[test]
    fn template_loads_from_json5() {
        let document = Document::from_json5(
            r#"{
                width: 320,
                viewBox: "0 0 320 200",
                root: { type: "group", children: [
                    { type: "text", props: { text: "hi", "data-element-type": "title" } },
                ] },
            }"#,
        )
        .expect("template");
        assert_eq!(document.width, Some(Length::Px(320.0)));
        assert_eq!(document.root.children[0].element_role(), Some(ElementRole::Title));
        assert!(Document::from_json5("{ root: 3 }").is_err());
    }
}
