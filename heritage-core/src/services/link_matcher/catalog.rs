use std::collections::{BTreeSet, HashMap};

use log::info;

use crate::model::link::LinkRecord;
use crate::model::row::RawRow;
use crate::services::extract::pick_text;

use super::matcher::{self, LinkMatch};
use super::tokenize::tokenize;

const NAME_KEYS: &[&str] = &["site", "site_name_en", "name_en", "site_en"];
const URL_KEYS: &[&str] = &["http_url"];
const IMAGE_KEYS: &[&str] = &["image_url"];

#[derive(Debug, Default)]
pub struct LinkCatalog {
    records: Vec<LinkRecord>,
    index: HashMap<String, Vec<usize>>,
}

impl LinkCatalog {
    pub fn new(records: Vec<LinkRecord>) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, r) in records.iter().enumerate() {
            for t in &r.tokens {
                index.entry(t.clone()).or_default().push(i);
            }
        }

        LinkCatalog { records, index }
    }

    pub fn from_rows(rows: &[RawRow]) -> Self {
        let records: Vec<LinkRecord> = rows.iter().map(record_from_row).collect();

        let with_url = records.iter().filter(|r| !r.url.is_empty()).count();
        info!(
            "[links] catalog loaded: {} records ({} with url)",
            records.len(),
            with_url
        );

        Self::new(records)
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&LinkRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same result as [`matcher::best_match_linear`], visiting only
    /// records that share at least one token.
    pub fn best_match(&self, tokens: &BTreeSet<String>) -> Option<LinkMatch> {
        let candidates: BTreeSet<usize> = tokens
            .iter()
            .filter_map(|t| self.index.get(t))
            .flatten()
            .copied()
            .collect();

        matcher::best_of(tokens, &self.records, candidates)
    }

    pub fn best_match_linear(&self, tokens: &BTreeSet<String>) -> Option<LinkMatch> {
        matcher::best_match_linear(tokens, &self.records)
    }
}

fn record_from_row(row: &RawRow) -> LinkRecord {
    let name = NAME_KEYS
        .iter()
        .map(|k| pick_text(row, &[*k]))
        .find(|s| !s.is_empty())
        .unwrap_or_default();

    LinkRecord {
        tokens: tokenize(&name),
        url: pick_text(row, URL_KEYS),
        image: pick_text(row, IMAGE_KEYS),
    }
}
