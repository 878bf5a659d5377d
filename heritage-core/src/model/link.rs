use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct LinkRecord {
    pub tokens: BTreeSet<String>,
    pub url: String,
    pub image: String,
}
