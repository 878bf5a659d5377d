use std::cell::Cell;
use std::fs;
use std::path::Path;

use heritage_core::model::config::PipelineConfig;
use heritage_core::protocol;
use heritage_core::services::pipeline;
use heritage_core::services::translation_map::{TranslateError, Translator};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Prefixes names with "JA:"; fails for names containing "Fail".
#[derive(Default)]
struct FakeTranslator {
    calls: Cell<usize>,
}

impl Translator for FakeTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.calls.set(self.calls.get() + 1);
        if text.contains("Fail") {
            return Err(TranslateError::Transport("connection reset".into()));
        }
        Ok(format!("JA:{text}"))
    }
}

const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<query>
  <row>
    <site>Historic City of Ayutthaya</site>
    <states>Thailand</states>
    <category>Cultural</category>
    <date_inscribed>1991</date_inscribed>
    <latitude>14.35</latitude>
    <longitude>100.56</longitude>
  </row>
  <row>
    <site>Rock Art & Petroglyphs of Nowhere</site>
    <states>Atlantis</states>
    <category>Natural</category>
    <date_inscribed>2001</date_inscribed>
  </row>
  <row>
    <site>Broken Row</states>
  </row>
  <row>
    <site lang="en">Fail Island</site>
    <category>Mixed</category>
    <latitude>0</latitude>
    <longitude>not-a-number</longitude>
  </row>
  <row>
    <states>Nameless</states>
  </row>
</query>
"#;

const CATALOG: &str = r#"<query>
  <row>
    <site>Historic City of Ayutthaya</site>
    <http_url> https://example.org/ayutthaya </http_url>
    <image_url>https://example.org/ayutthaya.jpg</image_url>
  </row>
  <row>
    <site>Something Else Entirely</site>
    <http_url>https://example.org/else</http_url>
  </row>
</query>
"#;

fn setup(dir: &Path) -> PipelineConfig {
    fs::write(dir.join("list.xml"), SOURCE).unwrap();
    fs::write(dir.join("links.xml"), CATALOG).unwrap();

    PipelineConfig {
        source_xml: dir.join("list.xml"),
        catalog_xml: dir.join("links.xml"),
        geojson_out: dir.join("out/world_heritage_ja.geojson"),
        translation_map: dir.join("translationMap.json"),
        translate_delay_ms: 0,
        checkpoint_every: 2,
        ..PipelineConfig::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn feature<'a>(geo: &'a Value, name: &str) -> &'a Value {
    geo["features"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["properties"]["name_en"] == name)
        .unwrap_or_else(|| panic!("feature {name} missing"))
}

#[test]
fn full_run_produces_display_layer_geojson() {
    let dir = TempDir::new().unwrap();
    let cfg = setup(dir.path());
    let translator = FakeTranslator::default();

    let report = pipeline::run(&cfg, &translator).unwrap();
    assert_eq!(report.ingest.rows_found, 5);
    assert_eq!(report.ingest.rows_skipped, 1);
    assert_eq!(report.build.features, 3);
    assert_eq!(report.build.dropped_without_name, 1);
    assert_eq!(report.translation.translated, 2);
    assert_eq!(report.translation.failed, 1);
    assert_eq!(report.enrich.matched, 1);
    assert!(report.backup.is_none());

    let geo = read_json(&cfg.geojson_out);
    assert_eq!(geo["type"], "FeatureCollection");
    assert_eq!(geo["features"].as_array().unwrap().len(), 3);

    let ayu = feature(&geo, "Historic City of Ayutthaya");
    assert_eq!(ayu["type"], "Feature");
    assert_eq!(ayu["geometry"], json!({ "type": "Point", "coordinates": [100.56, 14.35] }));
    assert_eq!(ayu["properties"]["種別"], "文化遺産");
    assert_eq!(ayu["properties"]["国"], "Thailand");
    assert_eq!(ayu["properties"]["登録年"], "1991");
    assert_eq!(ayu["properties"]["url"], "https://example.org/ayutthaya");
    assert_eq!(ayu["properties"]["image"], "https://example.org/ayutthaya.jpg");
    assert_eq!(ayu["properties"]["name_ja"], "JA:Historic City of Ayutthaya");

    let rock = feature(&geo, "Rock Art & Petroglyphs of Nowhere");
    assert!(rock["geometry"].is_null());
    assert_eq!(rock["properties"]["種別"], "自然遺産");
    assert_eq!(
        rock["properties"]["url"],
        "https://whc.unesco.org/en/list/?search=Rock%20Art%20%26%20Petroglyphs%20of%20Nowhere"
    );
    assert!(rock["properties"].get("image").is_none());

    // zero latitude is kept, but the unparseable longitude voids the point
    let fail = feature(&geo, "Fail Island");
    assert!(fail["geometry"].is_null());
    assert_eq!(fail["properties"]["種別"], "複合遺産");
    assert_eq!(fail["properties"]["登録年"], "");
    assert_eq!(fail["properties"]["name_ja"], "Fail Island");

    for f in geo["features"].as_array().unwrap() {
        let url = f["properties"]["url"].as_str().unwrap();
        assert!(!url.is_empty());
    }

    let map = read_json(&cfg.translation_map);
    assert_eq!(map["Fail Island"], "Fail Island");
    assert_eq!(map.as_object().unwrap().len(), 3);
}

#[test]
fn rerun_is_resumable_and_backs_up_previous_output() {
    let dir = TempDir::new().unwrap();
    let cfg = setup(dir.path());

    pipeline::run(&cfg, &FakeTranslator::default()).unwrap();
    let map_before = fs::read_to_string(&cfg.translation_map).unwrap();
    let geo_before = fs::read_to_string(&cfg.geojson_out).unwrap();

    let second = FakeTranslator::default();
    let report = pipeline::run(&cfg, &second).unwrap();

    assert_eq!(second.calls.get(), 0);
    assert_eq!(report.translation.cached, 3);
    assert_eq!(fs::read_to_string(&cfg.translation_map).unwrap(), map_before);

    let bak = dir.path().join("out/world_heritage_ja.geojson.bak");
    assert_eq!(report.backup.as_deref(), Some(bak.to_string_lossy().as_ref()));
    assert_eq!(fs::read_to_string(bak).unwrap(), geo_before);
}

#[test]
fn staged_commands_match_full_run() {
    let dir = TempDir::new().unwrap();
    let cfg = setup(dir.path());
    let translator = FakeTranslator::default();

    let build = pipeline::build_geojson(&cfg).unwrap();
    assert_eq!(build.features, 3);
    assert_eq!(build.without_geometry, 2);

    let fill = pipeline::fill_translations(&cfg, &translator).unwrap();
    assert_eq!(fill.requested, 3);

    assert_eq!(pipeline::merge_translations(&cfg).unwrap(), 3);

    let links = pipeline::inject_links(&cfg).unwrap();
    assert_eq!(links.features, 3);
    assert_eq!(links.matched, 1);
    assert_eq!(links.fallback_urls, 2);

    let staged = read_json(&cfg.geojson_out);

    let full_dir = TempDir::new().unwrap();
    let full_cfg = setup(full_dir.path());
    pipeline::run(&full_cfg, &FakeTranslator::default()).unwrap();
    assert_eq!(staged, read_json(&full_cfg.geojson_out));
}

#[test]
fn unwritable_output_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut cfg = setup(dir.path());

    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    cfg.geojson_out = blocker.join("world_heritage_ja.geojson");

    assert!(pipeline::run(&cfg, &FakeTranslator::default()).is_err());
}

#[test]
fn protocol_runs_pipeline_with_injected_translator() {
    let dir = TempDir::new().unwrap();
    let cfg = setup(dir.path());

    let factory = |_: &PipelineConfig| -> heritage_core::Result<Box<dyn Translator>> {
        Ok(Box::new(FakeTranslator::default()))
    };

    let request = json!({
        "id": 1,
        "cmd": "pipeline.run",
        "payload": { "config": serde_json::to_value(&cfg).unwrap() }
    })
    .to_string();

    let resp: Value = serde_json::from_str(&protocol::handle_with(&request, &factory)).unwrap();
    assert_eq!(resp["status"], "ok", "{resp}");
    assert_eq!(resp["payload"]["report"]["enrich"]["features"], 3);

    let inspect = json!({
        "id": 2,
        "cmd": "inspect",
        "payload": { "path": cfg.geojson_out, "sample": 2 }
    })
    .to_string();

    let resp: Value = serde_json::from_str(&protocol::handle_with(&inspect, &factory)).unwrap();
    assert_eq!(resp["payload"]["features"], 3);
    assert_eq!(resp["payload"]["with_url"], 3);
    assert_eq!(resp["payload"]["with_image"], 1);
    assert_eq!(resp["payload"]["sample_keys"].as_array().unwrap().len(), 2);
}

#[test]
fn protocol_reports_missing_input_as_error() {
    let dir = TempDir::new().unwrap();
    let request = json!({
        "id": "m",
        "cmd": "geojson.build",
        "payload": { "config": { "source_xml": dir.path().join("absent.xml") } }
    })
    .to_string();

    let resp: Value = serde_json::from_str(&protocol::handle(&request)).unwrap();
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["id"], "m");
}
