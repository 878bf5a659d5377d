use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lon, lat],
        }
    }
}

/// Property names are fixed by the map front end.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FeatureProperties {
    pub name_en: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ja: Option<String>,

    #[serde(rename = "国", default)]
    pub country: String,

    #[serde(rename = "種別", default)]
    pub category: String,

    #[serde(rename = "登録年", default)]
    pub year: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,

    pub geometry: Option<Geometry>,

    pub properties: FeatureProperties,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: CollectionType,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        FeatureCollection {
            kind: CollectionType::FeatureCollection,
            features,
        }
    }
}
