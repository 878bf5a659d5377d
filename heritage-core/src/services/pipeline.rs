use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::model::config::PipelineConfig;
use crate::model::row::RawRow;
use crate::parsers::heritage_xml::{self, IngestReport};
use crate::services::{
    encoding,
    enrich::{self, EnrichReport, LinkOptions},
    extract,
    geojson::{self, BuildReport},
    link_matcher::LinkCatalog,
    output,
    translation_map::{self, FillOptions, FillReport, TranslationStore, Translator},
};

#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub ingest: IngestReport,
    pub build: BuildReport,
    pub translation: FillReport,
    pub enrich: EnrichReport,
    pub output: String,
    pub backup: Option<String>,
}

pub fn load_rows(path: &Path) -> Result<(Vec<RawRow>, IngestReport)> {
    let decoded = encoding::read_text(path)?;
    let (rows, report) = heritage_xml::parse(&decoded.text);

    info!(
        "[ingest] {}: {} rows ({} skipped as malformed)",
        path.display(),
        report.rows_parsed,
        report.rows_skipped
    );

    Ok((rows, report))
}

fn site_names(rows: &[RawRow]) -> Vec<String> {
    rows.iter()
        .filter_map(extract::extract)
        .map(|r| r.site)
        .collect()
}

fn link_options(cfg: &PipelineConfig) -> LinkOptions<'_> {
    LinkOptions {
        threshold: cfg.match_threshold,
        search_url_base: &cfg.search_url_base,
    }
}

pub fn build_geojson(cfg: &PipelineConfig) -> Result<BuildReport> {
    let (rows, _) = load_rows(&cfg.source_xml)?;
    let (geo, report) = geojson::build(&rows);
    output::replace_json(&cfg.geojson_out, &geo)?;
    Ok(report)
}

pub fn fill_translations(cfg: &PipelineConfig, translator: &dyn Translator) -> Result<FillReport> {
    let (rows, _) = load_rows(&cfg.source_xml)?;
    let names = site_names(&rows);

    let mut store = TranslationStore::open(&cfg.translation_map)?;
    translation_map::fill(
        &mut store,
        names.iter().map(String::as_str),
        translator,
        FillOptions::from_config(cfg),
    )
}

pub fn merge_translations(cfg: &PipelineConfig) -> Result<usize> {
    let mut geo = geojson::load(&cfg.geojson_out)?;
    let store = TranslationStore::open(&cfg.translation_map)?;

    let hits = enrich::merge_translations(&mut geo, &store);
    output::replace_json(&cfg.geojson_out, &geo)?;
    Ok(hits)
}

pub fn inject_links(cfg: &PipelineConfig) -> Result<EnrichReport> {
    let mut geo = geojson::load(&cfg.geojson_out)?;
    let (catalog_rows, _) = load_rows(&cfg.catalog_xml)?;
    let catalog = LinkCatalog::from_rows(&catalog_rows);

    let report = enrich::inject_links(&mut geo, &catalog, &link_options(cfg));
    output::replace_json(&cfg.geojson_out, &geo)?;
    Ok(report)
}

/// Every stage in one pass; the output file is written once at the end.
pub fn run(cfg: &PipelineConfig, translator: &dyn Translator) -> Result<PipelineReport> {
    cfg.validate()?;

    let (rows, ingest) = load_rows(&cfg.source_xml)?;
    let (mut geo, build) = geojson::build(&rows);

    let mut store = TranslationStore::open(&cfg.translation_map)?;
    let names = site_names(&rows);
    let translation = translation_map::fill(
        &mut store,
        names.iter().map(String::as_str),
        translator,
        FillOptions::from_config(cfg),
    )?;

    let catalog = if cfg.catalog_xml == cfg.source_xml {
        LinkCatalog::from_rows(&rows)
    } else {
        let (catalog_rows, _) = load_rows(&cfg.catalog_xml)?;
        LinkCatalog::from_rows(&catalog_rows)
    };

    let enriched = enrich::enrich(&mut geo, &store, &catalog, &link_options(cfg));

    let backup = output::replace_json(&cfg.geojson_out, &geo)?;
    info!(
        "[pipeline] wrote {} features to {}",
        geo.features.len(),
        cfg.geojson_out.display()
    );

    Ok(PipelineReport {
        ingest,
        build,
        translation,
        enrich: enriched,
        output: cfg.geojson_out.to_string_lossy().to_string(),
        backup: backup.map(|p| p.to_string_lossy().to_string()),
    })
}
