use crate::scene::{Props, SceneNode, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Receives the attribute's current value (if any) and the node; `None`
/// leaves the attribute unset.
pub type RuleFn = Arc<dyn Fn(Option<&Value>, &SceneNode) -> Option<Value> + Send + Sync>;

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum AttrRule {
    /// Take the value of another attribute on the same node.
    CopyFrom { from: String },
    /// Apply `value` only when the node does not set the attribute itself.
    IfUnset { value: Value },
    #[serde(skip)]
    Custom(RuleFn),
}

impl fmt::Debug for AttrRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrRule::CopyFrom { from } => f.debug_struct("CopyFrom").field("from", from).finish(),
            AttrRule::IfUnset { value } => f.debug_struct("IfUnset").field("value", value).finish(),
            AttrRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynamicAttr {
    Rule(AttrRule),
    Literal(Value),
}

impl DynamicAttr {
    pub fn custom(rule: impl Fn(Option<&Value>, &SceneNode) -> Option<Value> + Send + Sync + 'static) -> Self {
        DynamicAttr::Rule(AttrRule::Custom(Arc::new(rule)))
    }

    fn evaluate(&self, key: &str, node: &SceneNode) -> Option<Value> {
        match self {
            DynamicAttr::Literal(value) => Some(value.clone()),
            DynamicAttr::Rule(AttrRule::CopyFrom { from }) => node.get(from).cloned(),
            DynamicAttr::Rule(AttrRule::IfUnset { value }) => match node.get(key) {
                Some(_) => None,
                None => Some(value.clone()),
            },
            DynamicAttr::Rule(AttrRule::Custom(rule)) => rule(node.get(key), node),
        }
    }
}

impl From<Value> for DynamicAttr {
    fn from(value: Value) -> Self {
        DynamicAttr::Literal(value)
    }
}

impl From<f32> for DynamicAttr {
    fn from(value: f32) -> Self {
        DynamicAttr::Literal(value.into())
    }
}

impl From<&str> for DynamicAttr {
    fn from(value: &str) -> Self {
        DynamicAttr::Literal(value.into())
    }
}

pub type DynamicAttributes = BTreeMap<String, DynamicAttr>;

/// Resolves `rules` against `node` into concrete attributes.
///
/// Rules run in key order and always observe the node as given, never the
/// output of an earlier rule.
pub fn resolve_attributes(node: &SceneNode, rules: &DynamicAttributes) -> Props {
    rules
        .iter()
        .filter_map(|(key, rule)| Some((key.clone(), rule.evaluate(key, node)?)))
        .collect()
}

/// Lifts static props into literal rules.
pub fn literal_rules(props: &Props) -> DynamicAttributes {
    props
        .iter()
        .map(|(key, value)| (key.clone(), DynamicAttr::Literal(value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::rect;

    #[test]
    fn literals_and_rules_resolve() {
        let node = rect().prop("fill", "#f00").prop("stroke", "#0f0");
        let mut rules = DynamicAttributes::new();
        rules.insert("opacity".into(), 0.5f32.into());
        rules.insert("fill".into(), DynamicAttr::Rule(AttrRule::IfUnset { value: "#000".into() }));
        rules.insert(
            "stroke-opacity".into(),
            DynamicAttr::Rule(AttrRule::IfUnset { value: 1.0f32.into() }),
        );
        rules.insert("color".into(), DynamicAttr::Rule(AttrRule::CopyFrom { from: "stroke".into() }));
        let resolved = resolve_attributes(&node, &rules);
        assert_eq!(resolved.get("opacity"), Some(&Value::Number(0.5)));
        assert_eq!(resolved.get("fill"), None);
        assert_eq!(resolved.get("stroke-opacity"), Some(&Value::Number(1.0)));
        assert_eq!(resolved.get("color"), Some(&Value::Text("#0f0".into())));
    }

    #[test]
    fn custom_rule_sees_unresolved_value_only() {
        let node = rect().prop("fill", "#f00");
        let mut rules = DynamicAttributes::new();
        rules.insert("fill".into(), "#00f".into());
        rules.insert(
            "stroke".into(),
            DynamicAttr::custom(|_, node| node.get("fill").cloned()),
        );
        rules.insert("opacity".into(), DynamicAttr::custom(|_, _| None));
        let resolved = resolve_attributes(&node, &rules);
        assert_eq!(resolved.get("fill"), Some(&Value::Text("#00f".into())));
        assert_eq!(resolved.get("stroke"), Some(&Value::Text("#f00".into())));
        assert!(!resolved.contains_key("opacity"));
    }

    #[test]
    fn custom_rule_receives_current_value() {
        let node = rect().prop("width", 40.0);
        let mut rules = DynamicAttributes::new();
        rules.insert(
            "width".into(),
            DynamicAttr::custom(|current, _| Some(Value::Number(current?.as_f32()? * 2.0))),
        );
        assert_eq!(
            resolve_attributes(&node, &rules).get("width"),
            Some(&Value::Number(80.0))
        );
    }

    #[test]
    fn rules_deserialize_from_json5() {
        let rules: DynamicAttributes =
            json5::from_str(r##"{ fill: "#fff", stroke: { rule: "copy-from", from: "fill" } }"##)
                .expect("rules");
        assert!(matches!(rules.get("fill"), Some(DynamicAttr::Literal(Value::Text(_)))));
        assert!(matches!(
            rules.get("stroke"),
            Some(DynamicAttr::Rule(AttrRule::CopyFrom { .. }))
        ));
    }
}
