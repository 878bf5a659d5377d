use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::error::{CoreError, Result};
use crate::model::config::PipelineConfig;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    #[error("invalid JSON from translation endpoint")]
    InvalidJson,

    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}

pub trait Translator {
    fn translate(&self, text: &str) -> std::result::Result<String, TranslateError>;
}

pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleTranslator {
    pub fn new(cfg: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.translate_timeout_secs))
            .build()
            .map_err(|e| CoreError::Http(e.to_string()))?;

        Ok(GoogleTranslator {
            client,
            endpoint: cfg.translate_endpoint.clone(),
            source_lang: cfg.source_lang.clone(),
            target_lang: cfg.target_lang.clone(),
        })
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> std::result::Result<String, TranslateError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let status = resp.status();

        // Body first, so a non-2xx response keeps its message
        let body = resp
            .text()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let json: Value = serde_json::from_str(&body).map_err(|_| TranslateError::InvalidJson)?;
        extract_translation(&json)
    }
}

/// Concatenates the first string of every segment in `json[0]`.
pub fn extract_translation(json: &Value) -> std::result::Result<String, TranslateError> {
    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or(TranslateError::Shape("missing segment array at [0]"))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();

    if out.trim().is_empty() {
        return Err(TranslateError::Shape("no translated text in segments"));
    }

    Ok(out)
}

fn status_error(status: StatusCode, body: &str) -> TranslateError {
    let trimmed = body.trim();
    let snippet = match trimmed.char_indices().nth(200) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    };

    TranslateError::Status {
        status: status.as_u16(),
        snippet,
    }
}
