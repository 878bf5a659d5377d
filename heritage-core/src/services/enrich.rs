use log::{debug, info};
use serde::Serialize;

use crate::model::feature::{Feature, FeatureCollection};
use crate::services::link_matcher::{tokenize, LinkCatalog};
use crate::services::translation_map::TranslationStore;

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct EnrichReport {
    pub features: usize,
    pub translated: usize,
    pub matched: usize,
    pub images: usize,
    pub fallback_urls: usize,
}

#[derive(Debug, Clone)]
pub struct LinkOptions<'a> {
    pub threshold: f64,
    pub search_url_base: &'a str,
}

pub fn search_url(base: &str, name_en: &str) -> String {
    format!("{base}{}", urlencoding::encode(name_en))
}

pub fn attach_translation(feature: &mut Feature, store: &TranslationStore) -> bool {
    match store.get(&feature.properties.name_en) {
        Some(ja) => {
            feature.properties.name_ja = Some(ja.to_string());
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkOutcome {
    pub matched: bool,
    pub image: bool,
    pub fallback: bool,
}

/// Attaches url/image from the best catalog match at or above the
/// threshold, then makes sure a url is present.
pub fn attach_links(feature: &mut Feature, catalog: &LinkCatalog, opts: &LinkOptions) -> LinkOutcome {
    let mut outcome = LinkOutcome::default();
    let props = &mut feature.properties;

    let tokens = tokenize(&props.name_en);
    let accepted = catalog
        .best_match(&tokens)
        .filter(|m| m.score >= opts.threshold)
        .and_then(|m| catalog.get(m.index).map(|rec| (m, rec)));

    match accepted {
        Some((m, rec)) => {
            outcome.matched = true;
            debug!("[links] {} matched #{} ({:.2})", props.name_en, m.index, m.score);
            if !rec.url.is_empty() {
                props.url = Some(rec.url.clone());
            }
            if !rec.image.is_empty() {
                props.image = Some(rec.image.clone());
                outcome.image = true;
            }
        }
        None => debug!("[links] {} has no match above threshold", props.name_en),
    }

    if props.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
        props.url = Some(search_url(opts.search_url_base, &props.name_en));
        outcome.fallback = true;
    }

    outcome
}

pub fn merge_translations(geo: &mut FeatureCollection, store: &TranslationStore) -> usize {
    let hits = geo
        .features
        .iter_mut()
        .map(|f| attach_translation(f, store))
        .filter(|hit| *hit)
        .count();

    info!("[merge] name_ja attached to {hits}/{} features", geo.features.len());
    hits
}

pub fn inject_links(geo: &mut FeatureCollection, catalog: &LinkCatalog, opts: &LinkOptions) -> EnrichReport {
    let mut report = EnrichReport {
        features: geo.features.len(),
        ..Default::default()
    };

    for f in geo.features.iter_mut() {
        let o = attach_links(f, catalog, opts);
        report.matched += o.matched as usize;
        report.images += o.image as usize;
        report.fallback_urls += o.fallback as usize;
    }

    info!(
        "[links] {} matched, {} images, url on all {} features ({} search fallbacks)",
        report.matched, report.images, report.features, report.fallback_urls
    );

    report
}

pub fn enrich(
    geo: &mut FeatureCollection,
    store: &TranslationStore,
    catalog: &LinkCatalog,
    opts: &LinkOptions,
) -> EnrichReport {
    let translated = merge_translations(geo, store);
    let mut report = inject_links(geo, catalog, opts);
    report.translated = translated;
    report
}
