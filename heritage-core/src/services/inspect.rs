use serde::Serialize;
use serde_json::Value;

use crate::model::feature::FeatureCollection;

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub features: usize,
    pub with_geometry: usize,
    pub with_name_ja: usize,
    pub with_url: usize,
    pub with_image: usize,
    pub sample_keys: Vec<Vec<String>>,
}

/// Coverage counts plus the property keys of the first `sample` features,
/// sorted by key.
pub fn inspect(geo: &FeatureCollection, sample: usize) -> InspectReport {
    let mut report = InspectReport {
        features: geo.features.len(),
        ..Default::default()
    };

    for f in &geo.features {
        let p = &f.properties;
        report.with_geometry += f.geometry.is_some() as usize;
        report.with_name_ja += p.name_ja.is_some() as usize;
        report.with_url += p.url.as_deref().map_or(false, |u| !u.is_empty()) as usize;
        report.with_image += p.image.is_some() as usize;
    }

    report.sample_keys = geo
        .features
        .iter()
        .take(sample)
        .map(|f| match serde_json::to_value(&f.properties) {
            Ok(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        })
        .collect();

    report
}
