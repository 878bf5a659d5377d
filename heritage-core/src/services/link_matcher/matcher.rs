use std::collections::BTreeSet;

use crate::model::link::LinkRecord;

pub fn intersection_size(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|t| large.contains(*t)).count()
}

/// |A∩B| / |A∪B|. Two empty sets are identical and score 1.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let inter = intersection_size(a, b);
    let union = a.len() + b.len() - inter;
    if union == 0 {
        return 1.0;
    }
    inter as f64 / union as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkMatch {
    pub index: usize,
    pub score: f64,
}

/// Scans `indices` in the given order and keeps the first candidate with
/// the highest score. Stops at a perfect score.
pub fn best_of<I>(tokens: &BTreeSet<String>, records: &[LinkRecord], indices: I) -> Option<LinkMatch>
where
    I: IntoIterator<Item = usize>,
{
    let mut best: Option<LinkMatch> = None;

    for index in indices {
        let rec = &records[index];

        let inter = intersection_size(tokens, &rec.tokens);
        if inter == 0 {
            continue;
        }

        let score = inter as f64 / (tokens.len() + rec.tokens.len() - inter) as f64;
        if best.map_or(true, |b| score > b.score) {
            best = Some(LinkMatch { index, score });
        }

        if score >= 1.0 {
            break;
        }
    }

    best
}

pub fn best_match_linear(tokens: &BTreeSet<String>, records: &[LinkRecord]) -> Option<LinkMatch> {
    best_of(tokens, records, 0..records.len())
}
