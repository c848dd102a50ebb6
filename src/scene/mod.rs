//! Scene tree model.
//!
//! Every structure, item and decoration is a pure function that returns a
//! [`SceneNode`]. Trees are plain values: they are built fresh for each render
//! pass, compared structurally and serialized with serde so templates can be
//! authored on disk.

pub mod bounds;

pub use bounds::{Bounds, resolve_bounds};

use crate::item::{ItemPath, path_to_key};
use crate::text_metrics::TextMeasure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Prop key carrying the element role used by the template renderer.
pub const ROLE_KEY: &str = "data-element-type";
/// Prop key carrying the item key of item-scoped elements.
pub const INDEXES_KEY: &str = "data-indexes";
/// Prop key carrying text content.
pub const TEXT_KEY: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Opaque prop value. Unknown props survive untouched until serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f32),
    Text(String),
    Indexes(Vec<usize>),
    Points(Vec<Point>),
}

impl Value {
    /// Numeric view of the value. Text such as `"12px"` is accepted.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Number(value) => Some(*value),
            Value::Text(text) => text.trim().trim_end_matches("px").trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Attribute text as written into the output document.
    pub fn to_attr(&self) -> String {
        match self {
            Value::Bool(value) => value.to_string(),
            Value::Number(value) => format_number(*value),
            Value::Text(text) => text.clone(),
            Value::Indexes(path) => path_to_key(path),
            Value::Points(points) => points
                .iter()
                .map(|p| format!("{},{}", format_number(p.x), format_number(p.y)))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Point>> for Value {
    fn from(value: Vec<Point>) -> Self {
        Value::Points(value)
    }
}

impl From<Vec<usize>> for Value {
    fn from(value: Vec<usize>) -> Self {
        Value::Indexes(value)
    }
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn format_number(value: f32) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub type Props = BTreeMap<String, Value>;

/// Roles recognized by the template renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    Title,
    Desc,
    Illus,
    Shape,
    ShapesGroup,
    BtnsGroup,
    ItemsGroup,
    BtnAdd,
    BtnRemove,
    ItemLabel,
    ItemDesc,
    ItemValue,
    ItemIcon,
    ItemIllus,
    Text,
    Decoration,
}

impl ElementRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementRole::Title => "title",
            ElementRole::Desc => "desc",
            ElementRole::Illus => "illus",
            ElementRole::Shape => "shape",
            ElementRole::ShapesGroup => "shapes-group",
            ElementRole::BtnsGroup => "btns-group",
            ElementRole::ItemsGroup => "items-group",
            ElementRole::BtnAdd => "btn-add",
            ElementRole::BtnRemove => "btn-remove",
            ElementRole::ItemLabel => "item-label",
            ElementRole::ItemDesc => "item-desc",
            ElementRole::ItemValue => "item-value",
            ElementRole::ItemIcon => "item-icon",
            ElementRole::ItemIllus => "item-illus",
            ElementRole::Text => "text",
            ElementRole::Decoration => "decoration",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let role = match token {
            "title" => ElementRole::Title,
            "desc" => ElementRole::Desc,
            "illus" => ElementRole::Illus,
            "shape" => ElementRole::Shape,
            "shapes-group" => ElementRole::ShapesGroup,
            "btns-group" => ElementRole::BtnsGroup,
            "items-group" => ElementRole::ItemsGroup,
            "btn-add" => ElementRole::BtnAdd,
            "btn-remove" => ElementRole::BtnRemove,
            "item-label" => ElementRole::ItemLabel,
            "item-desc" => ElementRole::ItemDesc,
            "item-value" => ElementRole::ItemValue,
            "item-icon" => ElementRole::ItemIcon,
            "item-illus" => ElementRole::ItemIllus,
            "text" => ElementRole::Text,
            "decoration" => ElementRole::Decoration,
            _ => return None,
        };
        Some(role)
    }

    pub fn is_item_scoped(self) -> bool {
        matches!(
            self,
            ElementRole::ItemLabel
                | ElementRole::ItemDesc
                | ElementRole::ItemValue
                | ElementRole::ItemIcon
                | ElementRole::ItemIllus
        )
    }
}

/// Shared, read-only inputs for bounds resolution and component expansion.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub measure: &'a dyn TextMeasure,
}

impl<'a> LayoutContext<'a> {
    pub fn new(measure: &'a dyn TextMeasure) -> Self {
        Self { measure }
    }
}

/// A deferred node type: expanded into primitives when bounds are resolved
/// or the tree is materialized.
///
/// Per-node settings belong in the node's props. Any state a component does
/// carry must show in its `Debug` output, which is what node equality compares.
pub trait Component: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, props: &Props, children: &[SceneNode], ctx: &LayoutContext<'_>) -> SceneNode;
}

#[derive(Clone)]
pub struct ComponentRef(Arc<dyn Component>);

impl ComponentRef {
    pub fn new<C: Component + 'static>(component: C) -> Self {
        Self(Arc::new(component))
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn render(&self, props: &Props, children: &[SceneNode], ctx: &LayoutContext<'_>) -> SceneNode {
        self.0.render(props, children, ctx)
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentRef").field(&self.name()).finish()
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.name() == other.name() && format!("{:?}", self.0) == format!("{:?}", other.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Group,
    Rect,
    Ellipse,
    Polygon,
    Path,
    Text,
    Icon,
    Illus,
    Fragment,
    Spacer,
    #[serde(skip)]
    Component(ComponentRef),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

/// Structural constructor. Props are stored as given.
pub fn create_node(kind: NodeKind, props: Props, children: Vec<SceneNode>) -> SceneNode {
    SceneNode {
        kind,
        props,
        children,
    }
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        create_node(kind, Props::new(), Vec::new())
    }

    pub fn component<C: Component + 'static>(component: C) -> Self {
        Self::new(NodeKind::Component(ComponentRef::new(component)))
    }

    pub fn prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn maybe_prop(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.prop(key, value),
            None => self,
        }
    }

    pub fn at(self, x: f32, y: f32) -> Self {
        self.prop("x", x).prop("y", y)
    }

    pub fn size(self, width: f32, height: f32) -> Self {
        self.prop("width", width).prop("height", height)
    }

    pub fn role(self, role: ElementRole) -> Self {
        self.prop(ROLE_KEY, role.as_str())
    }

    /// Tags the node as belonging to the item at `path`.
    pub fn indexes(self, path: &[usize]) -> Self {
        self.prop(INDEXES_KEY, path_to_key(path))
    }

    pub fn child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.props.get(key).and_then(Value::as_f32)
    }

    pub fn str_prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_prop("id")
    }

    pub fn element_role(&self) -> Option<ElementRole> {
        self.str_prop(ROLE_KEY).and_then(ElementRole::from_token)
    }

    pub fn text(&self) -> &str {
        self.str_prop(TEXT_KEY).unwrap_or("")
    }

    pub fn x(&self) -> f32 {
        self.number("x").unwrap_or(0.0)
    }

    pub fn y(&self) -> f32 {
        self.number("y").unwrap_or(0.0)
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group | NodeKind::Fragment)
    }

    /// Depth-first, document-order visit of this node and its descendants.
    pub fn walk<'s>(&'s self, visit: &mut impl FnMut(&'s SceneNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.walk_mut(visit);
        }
    }

    /// First node in document order whose `id` matches.
    pub fn find_by_id(&self, id: &str) -> Option<&SceneNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_id(id))
    }
}

pub fn group() -> SceneNode {
    SceneNode::new(NodeKind::Group)
}

pub fn fragment(children: impl IntoIterator<Item = SceneNode>) -> SceneNode {
    SceneNode::new(NodeKind::Fragment).with_children(children)
}

pub fn rect() -> SceneNode {
    SceneNode::new(NodeKind::Rect)
}

pub fn ellipse() -> SceneNode {
    SceneNode::new(NodeKind::Ellipse)
}

pub fn polygon(points: Vec<Point>) -> SceneNode {
    SceneNode::new(NodeKind::Polygon).prop("points", points)
}

pub fn path(d: impl Into<String>) -> SceneNode {
    SceneNode::new(NodeKind::Path).prop("d", d.into())
}

pub fn text(content: impl Into<String>) -> SceneNode {
    SceneNode::new(NodeKind::Text).prop(TEXT_KEY, content.into())
}

pub fn icon() -> SceneNode {
    SceneNode::new(NodeKind::Icon)
}

pub fn illus() -> SceneNode {
    SceneNode::new(NodeKind::Illus)
}

/// Zero-content gap used inside mixed flex layouts.
pub fn spacer(width: f32, height: f32) -> SceneNode {
    SceneNode::new(NodeKind::Spacer).size(width, height)
}

/// Expands components and fragments until only drawable primitives remain.
///
/// Spacers are dropped: they only exist to influence layout.
pub fn materialize(node: &SceneNode, ctx: &LayoutContext<'_>) -> SceneNode {
    let mut expanded = expand(node, ctx);
    if expanded.len() == 1 {
        expanded.remove(0)
    } else {
        group().with_children(expanded)
    }
}

fn expand(node: &SceneNode, ctx: &LayoutContext<'_>) -> Vec<SceneNode> {
    match &node.kind {
        NodeKind::Component(component) => {
            let rendered = component.render(&node.props, &node.children, ctx);
            expand(&rendered, ctx)
        }
        NodeKind::Fragment => node
            .children
            .iter()
            .flat_map(|child| expand(child, ctx))
            .collect(),
        NodeKind::Spacer => Vec::new(),
        _ => {
            let children = node
                .children
                .iter()
                .flat_map(|child| expand(child, ctx))
                .collect();
            vec![create_node(node.kind.clone(), node.props.clone(), children)]
        }
    }
}

/// Item path tagged on an item-scoped node, if any.
pub fn tagged_path(node: &SceneNode) -> Option<Result<ItemPath, crate::item::AddressError>> {
    if let Some(key) = node.get(INDEXES_KEY) {
        return Some(match key {
            Value::Indexes(path) => Ok(path.clone()),
            other => crate::item::key_to_path(&other.to_attr()),
        });
    }
    node.id()
        .filter(|id| id.starts_with(crate::item::ITEM_PREFIX))
        .map(crate::item::id_to_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FixedMetrics;

    #[derive(Debug)]
    struct Badge;

    impl Component for Badge {
        fn name(&self) -> &str {
            "badge"
        }

        fn render(&self, props: &Props, _children: &[SceneNode], _ctx: &LayoutContext<'_>) -> SceneNode {
            let label = props.get("label").map(Value::to_attr).unwrap_or_default();
            group().child(rect().size(40.0, 20.0)).child(text(label).size(40.0, 20.0))
        }
    }

    #[test]
    fn equal_inputs_build_equal_trees() {
        let build = || {
            group()
                .prop("id", "root")
                .child(rect().at(1.0, 2.0).size(3.0, 4.0).prop("custom-flag", true))
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn components_compare_by_name_and_props() {
        let a = SceneNode::component(Badge).prop("label", "A");
        let b = SceneNode::component(Badge).prop("label", "A");
        let c = SceneNode::component(Badge).prop("label", "C");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[derive(Debug)]
    struct Ribbon {
        thickness: u32,
    }

    impl Component for Ribbon {
        fn name(&self) -> &str {
            "ribbon"
        }

        fn render(&self, _props: &Props, _children: &[SceneNode], _ctx: &LayoutContext<'_>) -> SceneNode {
            rect().size(100.0, self.thickness as f32)
        }
    }

    #[test]
    fn component_state_takes_part_in_equality() {
        let thin = SceneNode::component(Ribbon { thickness: 2 });
        let thick = SceneNode::component(Ribbon { thickness: 8 });
        assert_ne!(thin, thick);
        assert_eq!(thin, SceneNode::component(Ribbon { thickness: 2 }));
        assert_eq!(thin.clone(), thin);
    }

    #[test]
    fn materialize_expands_components_and_fragments() {
        let metrics = FixedMetrics::default();
        let ctx = LayoutContext::new(&metrics);
        let tree = group()
            .child(fragment(vec![
                SceneNode::component(Badge).prop("label", "A"),
                spacer(10.0, 0.0),
            ]))
            .child(rect());
        let out = materialize(&tree, &ctx);
        assert_eq!(out.children.len(), 2);
        assert_eq!(out.children[0].kind, NodeKind::Group);
        assert_eq!(out.children[0].children[1].text(), "A");
        assert_eq!(out.children[1].kind, NodeKind::Rect);
    }

    #[test]
    fn unknown_props_survive_serde() {
        let node = rect().prop("x-custom", "keep me").prop("width", 10.0);
        let json = serde_json::to_string(&node).unwrap();
        let back: SceneNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.str_prop("x-custom"), Some("keep me"));
        assert!(json.contains("\"type\":\"rect\""));
    }

    #[test]
    fn format_number_trims_trailing_zeros() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(10.5), "10.5");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(1.256), "1.26");
    }

    #[test]
    fn tagged_path_prefers_indexes_prop() {
        let node = text("x").prop("id", "item-9-label").indexes(&[0, 2]);
        assert_eq!(tagged_path(&node), Some(Ok(vec![0, 2])));
        let by_id = text("x").prop("id", "item-2_1-label");
        assert_eq!(tagged_path(&by_id), Some(Ok(vec![1, 0])));
        assert_eq!(tagged_path(&text("x")), None);
    }
}
