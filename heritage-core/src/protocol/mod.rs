use std::path::Path;

use serde_json::{json, Value};

use crate::error::{CoreError, Result};
use crate::model::config::PipelineConfig;
use crate::parsers::heritage_xml;
use crate::services::translation_map::{GoogleTranslator, Translator};
use crate::services::{encoding, extract, geojson, inspect, link_matcher, pipeline};

mod command;
use command::Command;

pub type TranslatorFactory<'a> = &'a dyn Fn(&PipelineConfig) -> Result<Box<dyn Translator>>;

const DEFAULT_PREVIEW: usize = 5;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn usize_field(payload: &Value, key: &str, default: usize) -> usize {
    payload
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|n| n as usize)
        .unwrap_or(default)
}

/// Defaults, then `payload.config_path`, then inline `payload.config` keys.
fn config_from_payload(payload: &Value) -> Result<PipelineConfig> {
    let base = match str_field(payload, "config_path") {
        Some(p) => PipelineConfig::load(Path::new(p))?,
        None => PipelineConfig::default(),
    };

    let cfg = match payload.get("config") {
        None | Some(Value::Null) => base,
        Some(Value::Object(overrides)) => {
            let mut merged = serde_json::to_value(&base)?;
            if let Value::Object(map) = &mut merged {
                for (k, v) in overrides {
                    map.insert(k.clone(), v.clone());
                }
            }
            serde_json::from_value(merged)
                .map_err(|e| CoreError::InvalidConfig(e.to_string()))?
        }
        Some(_) => {
            return Err(CoreError::InvalidRequest(
                "payload.config must be an object".into(),
            ))
        }
    };

    cfg.validate()?;
    Ok(cfg)
}

fn default_translator(cfg: &PipelineConfig) -> Result<Box<dyn Translator>> {
    Ok(Box::new(GoogleTranslator::new(cfg)?))
}

pub fn handle(input: &str) -> String {
    handle_with(input, &default_translator)
}

pub fn handle_with(input: &str, make_translator: TranslatorFactory) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match dispatch(Command::from(get_cmd(&req)), payload, make_translator) {
        Ok(v) => ok(id, v),
        Err(e) => err(id, e.to_string()),
    }
}

fn dispatch(cmd: Command, payload: &Value, make_translator: TranslatorFactory) -> Result<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "heritage-core alive" })),

        Command::Ingest => {
            let text = match (str_field(payload, "xml"), str_field(payload, "path")) {
                (Some(xml), _) => xml.to_string(),
                (None, Some(path)) => encoding::read_text(Path::new(path))?.text,
                (None, None) => {
                    return Err(CoreError::InvalidRequest(
                        "payload.xml or payload.path is required".into(),
                    ))
                }
            };

            let (rows, report) = heritage_xml::parse(&text);
            let (sources, dropped) = extract::extract_all(&rows);
            let preview: Vec<_> = sources
                .iter()
                .take(usize_field(payload, "preview", DEFAULT_PREVIEW))
                .collect();

            Ok(json!({
                "report": report,
                "sites": sources.len(),
                "dropped_without_name": dropped,
                "preview": preview
            }))
        }

        Command::Tokenize => {
            let text = payload.get("text").and_then(|v| v.as_str()).unwrap_or("");
            let tokens: Vec<String> = link_matcher::tokenize(text).into_iter().collect();
            Ok(json!({ "tokens": tokens }))
        }

        Command::GeojsonBuild => {
            let cfg = config_from_payload(payload)?;
            let report = pipeline::build_geojson(&cfg)?;
            Ok(json!({ "report": report, "output": cfg.geojson_out }))
        }

        Command::TranslationFill => {
            let cfg = config_from_payload(payload)?;
            let translator = make_translator(&cfg)?;
            let report = pipeline::fill_translations(&cfg, translator.as_ref())?;
            Ok(json!({ "report": report, "translation_map": cfg.translation_map }))
        }

        Command::TranslationMerge => {
            let cfg = config_from_payload(payload)?;
            let merged = pipeline::merge_translations(&cfg)?;
            Ok(json!({ "merged": merged, "output": cfg.geojson_out }))
        }

        Command::LinksInject => {
            let cfg = config_from_payload(payload)?;
            let report = pipeline::inject_links(&cfg)?;
            Ok(json!({ "report": report, "output": cfg.geojson_out }))
        }

        Command::PipelineRun => {
            let cfg = config_from_payload(payload)?;
            let translator = make_translator(&cfg)?;
            let report = pipeline::run(&cfg, translator.as_ref())?;
            Ok(json!({ "report": report }))
        }

        Command::Inspect => {
            let cfg = config_from_payload(payload)?;
            let path = str_field(payload, "path")
                .map(Path::new)
                .unwrap_or(cfg.geojson_out.as_path());
            let geo = geojson::load(path)?;
            let sample = usize_field(payload, "sample", DEFAULT_PREVIEW);
            Ok(serde_json::to_value(inspect::inspect(&geo, sample))?)
        }

        Command::Unknown => Err(CoreError::InvalidRequest("unknown command".into())),
    }
}
