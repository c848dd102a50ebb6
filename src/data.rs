use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Dataset rendered into an infographic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    pub title: Option<String>,
    pub desc: Option<String>,
    pub items: Vec<ItemDatum>,
    /// Document-level illustrations keyed by element id.
    pub illus: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDatum {
    pub id: Option<String>,
    pub label: Option<String>,
    pub desc: Option<String>,
    pub value: Option<DatumValue>,
    pub icon: Option<String>,
    pub illus: Option<String>,
    pub children: Vec<ItemDatum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatumValue {
    Number(f64),
    Text(String),
}

impl DatumValue {
    pub fn format(&self) -> String {
        match self {
            DatumValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            DatumValue::Number(value) => value.to_string(),
            DatumValue::Text(text) => text.clone(),
        }
    }
}

impl ItemDatum {
    pub fn labeled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::default()
        }
    }
}

impl Data {
    /// Datum at `path`; the empty path addresses no item.
    pub fn datum(&self, path: &[usize]) -> Option<&ItemDatum> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.items.get(*first)?, |datum, index| datum.children.get(*index))
    }

    pub fn from_json5(source: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str(source)?)
    }
}

/// Datum owning `path`, if the dataset has one there.
pub fn datum_by_path<'a>(data: &'a Data, path: &[usize]) -> Option<&'a ItemDatum> {
    data.datum(path)
}

/// Reads a JSON or JSON5 dataset from `path`, or from stdin when the path
/// is absent or `-`.
pub fn load_data(path: Option<&Path>) -> anyhow::Result<Data> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Data::from_json5(&contents)
}
