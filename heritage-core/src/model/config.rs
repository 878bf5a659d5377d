use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

fn default_source_xml() -> PathBuf {
    PathBuf::from("list.xml")
}

fn default_geojson_out() -> PathBuf {
    PathBuf::from("world_heritage_ja.geojson")
}

fn default_translation_map() -> PathBuf {
    PathBuf::from("translationMap.json")
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "ja".to_string()
}

fn default_translate_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_translate_delay_ms() -> u64 {
    1000
}

fn default_translate_timeout_secs() -> u64 {
    30
}

fn default_checkpoint_every() -> usize {
    50
}

fn default_match_threshold() -> f64 {
    0.40
}

fn default_search_url_base() -> String {
    "https://whc.unesco.org/en/list/?search=".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_source_xml")]
    pub source_xml: PathBuf,

    /// Link/image catalog. The export usually carries `http_url` and
    /// `image_url` itself, so this defaults to the same file.
    #[serde(default = "default_source_xml", alias = "catalog")]
    pub catalog_xml: PathBuf,

    #[serde(default = "default_geojson_out", alias = "output")]
    pub geojson_out: PathBuf,

    #[serde(default = "default_translation_map")]
    pub translation_map: PathBuf,

    #[serde(default = "default_source_lang", alias = "sl")]
    pub source_lang: String,

    #[serde(default = "default_target_lang", alias = "tl")]
    pub target_lang: String,

    #[serde(default = "default_translate_endpoint")]
    pub translate_endpoint: String,

    #[serde(default = "default_translate_delay_ms")]
    pub translate_delay_ms: u64,

    #[serde(default = "default_translate_timeout_secs")]
    pub translate_timeout_secs: u64,

    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,

    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,

    #[serde(default = "default_search_url_base")]
    pub search_url_base: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            source_xml: default_source_xml(),
            catalog_xml: default_source_xml(),
            geojson_out: default_geojson_out(),
            translation_map: default_translation_map(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            translate_endpoint: default_translate_endpoint(),
            translate_delay_ms: default_translate_delay_ms(),
            translate_timeout_secs: default_translate_timeout_secs(),
            checkpoint_every: default_checkpoint_every(),
            match_threshold: default_match_threshold(),
            search_url_base: default_search_url_base(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let cfg: PipelineConfig =
            serde_json::from_str(&data).map_err(|e| CoreError::json(path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_every == 0 {
            return Err(CoreError::InvalidConfig(
                "checkpoint_every must be at least 1".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(CoreError::InvalidConfig(format!(
                "match_threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }

        if self.source_lang.trim().is_empty() || self.target_lang.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "source_lang and target_lang are required".into(),
            ));
        }

        Ok(())
    }
}
