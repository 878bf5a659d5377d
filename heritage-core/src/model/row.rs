use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key under which an element's own text is stored when it also carries
/// attributes or child elements.
pub const TEXT_KEY: &str = "#text";

/// Prefix for attribute keys inside a [`RawValue::Node`].
pub const ATTR_PREFIX: &str = "@_";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    List(Vec<RawValue>),
    Node(BTreeMap<String, RawValue>),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RawRow {
    pub fields: BTreeMap<String, RawValue>,
}

impl RawRow {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cultural,
    Natural,
    Mixed,
}

impl Category {
    /// Only the two explicit tags are recognized; everything else is
    /// treated as mixed.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Cultural" => Category::Cultural,
            "Natural" => Category::Natural,
            _ => Category::Mixed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Cultural => "文化遺産",
            Category::Natural => "自然遺産",
            Category::Mixed => "複合遺産",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Mixed
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceRow {
    pub site: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub category: Category,

    #[serde(default)]
    pub year: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,
}
