use std::fs;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::model::feature::{Feature, FeatureCollection, FeatureProperties, FeatureType, Geometry};
use crate::model::row::{RawRow, SourceRow};
use crate::services::extract;

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub features: usize,
    pub without_geometry: usize,
    pub dropped_without_name: usize,
}

pub fn to_feature(row: &SourceRow) -> Feature {
    let geometry = match (row.latitude, row.longitude) {
        (Some(lat), Some(lon)) => Some(Geometry::point(lon, lat)),
        _ => None,
    };

    Feature {
        kind: FeatureType::Feature,
        geometry,
        properties: FeatureProperties {
            name_en: row.site.clone(),
            name_ja: None,
            country: row.country.clone(),
            category: row.category.label().to_string(),
            year: row.year.clone().unwrap_or_default(),
            url: None,
            image: None,
        },
    }
}

pub fn build(rows: &[RawRow]) -> (FeatureCollection, BuildReport) {
    let (sources, dropped) = extract::extract_all(rows);

    let features: Vec<Feature> = sources.iter().map(to_feature).collect();
    let without_geometry = features.iter().filter(|f| f.geometry.is_none()).count();

    let report = BuildReport {
        features: features.len(),
        without_geometry,
        dropped_without_name: dropped,
    };

    info!(
        "[geojson] {} features ({} without coordinates, {} rows without a name)",
        report.features, report.without_geometry, report.dropped_without_name
    );

    (FeatureCollection::new(features), report)
}

pub fn load(path: &Path) -> Result<FeatureCollection> {
    let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| CoreError::json(path, e))
}
