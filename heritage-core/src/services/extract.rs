use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::model::row::{Category, RawRow, RawValue, SourceRow, TEXT_KEY};

const SITE_KEYS: &[&str] = &["site"];
const LAT_KEYS: &[&str] = &["latitude", "lat", "latitude_deg"];
const LON_KEYS: &[&str] = &["longitude", "lon", "longitude_deg"];
const YEAR_KEYS: &[&str] = &["date_inscribed", "year"];
const COUNTRY_KEYS: &[&str] = &["states", "country", "state"];
const CATEGORY_KEYS: &[&str] = &["category"];

/// Reduces any field shape to its scalar text: strings are trimmed, lists
/// yield their first element, nodes yield their text node.
pub fn unwrap_text(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::List(items) => items.first().map(unwrap_text).unwrap_or_default(),
        RawValue::Node(map) => map.get(TEXT_KEY).map(unwrap_text).unwrap_or_default(),
    }
}

/// First key present in the row wins, even if its value turns out empty.
pub fn pick<'a>(row: &'a RawRow, keys: &[&str]) -> Option<&'a RawValue> {
    keys.iter().find_map(|k| row.get(k))
}

pub fn pick_text(row: &RawRow, keys: &[&str]) -> String {
    pick(row, keys).map(unwrap_text).unwrap_or_default()
}

fn leading_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap())
}

/// Longest numeric prefix, so `"14.35N"` is 14.35. Non-finite is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let m = leading_number_re().find(text.trim_start())?;
    let n: f64 = m.as_str().parse().ok()?;
    n.is_finite().then_some(n)
}

fn parse_year(text: &str) -> Option<String> {
    let t = text.trim();
    parse_number(t).map(|_| t.to_string())
}

pub fn extract(row: &RawRow) -> Option<SourceRow> {
    let site = pick_text(row, SITE_KEYS);
    if site.is_empty() {
        debug!("[extract] row without site name dropped");
        return None;
    }

    Some(SourceRow {
        site,
        country: pick_text(row, COUNTRY_KEYS),
        category: Category::from_tag(&pick_text(row, CATEGORY_KEYS)),
        year: parse_year(&pick_text(row, YEAR_KEYS)),
        latitude: parse_number(&pick_text(row, LAT_KEYS)),
        longitude: parse_number(&pick_text(row, LON_KEYS)),
    })
}

pub fn extract_all(rows: &[RawRow]) -> (Vec<SourceRow>, usize) {
    let mut out = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for r in rows {
        match extract(r) {
            Some(s) => out.push(s),
            None => dropped += 1,
        }
    }

    (out, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn t(v: &str) -> RawValue {
        RawValue::Text(v.to_string())
    }

    fn row(pairs: &[(&str, RawValue)]) -> RawRow {
        RawRow {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn unwraps_all_three_shapes() {
        assert_eq!(unwrap_text(&t("  Petra ")), "Petra");
        assert_eq!(
            unwrap_text(&RawValue::List(vec![t("First"), t("Second")])),
            "First"
        );

        let mut node = BTreeMap::new();
        node.insert("@_lang".to_string(), t("en"));
        node.insert("#text".to_string(), t("Nested"));
        assert_eq!(unwrap_text(&RawValue::Node(node.clone())), "Nested");

        let deep = RawValue::List(vec![RawValue::Node(node)]);
        assert_eq!(unwrap_text(&deep), "Nested");

        assert_eq!(unwrap_text(&RawValue::List(vec![])), "");
        assert_eq!(unwrap_text(&RawValue::Node(BTreeMap::new())), "");
    }

    #[test]
    fn empty_site_is_excluded() {
        assert!(extract(&row(&[("site", t("   "))])).is_none());
        assert!(extract(&row(&[("country", t("Peru"))])).is_none());
    }

    #[test]
    fn zero_is_a_coordinate_and_garbage_is_none() {
        let r = extract(&row(&[
            ("site", t("Equator Site")),
            ("latitude", t("0")),
            ("longitude", t("abc")),
        ]))
        .unwrap();
        assert_eq!(r.latitude, Some(0.0));
        assert_eq!(r.longitude, None);

        let r = extract(&row(&[
            ("site", t("X")),
            ("lat", t("NaN")),
            ("lon", t("inf")),
        ]))
        .unwrap();
        assert_eq!(r.latitude, None);
        assert_eq!(r.longitude, None);
    }

    #[test]
    fn numbers_read_their_leading_prefix() {
        assert_eq!(parse_number("14.35N"), Some(14.35));
        assert_eq!(parse_number("100.56°"), Some(100.56));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number(".5e1x"), Some(5.0));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(parse_number("N14.35"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn first_present_key_wins() {
        let r = extract(&row(&[
            ("site", t("X")),
            ("latitude", t("")),
            ("lat", t("12.5")),
            ("lon", t("-3.25")),
            ("longitude_deg", t("99")),
        ]))
        .unwrap();
        assert_eq!(r.latitude, None);
        assert_eq!(r.longitude, Some(-3.25));
    }

    #[test]
    fn categories_year_and_country() {
        let r = extract(&row(&[
            ("site", t("Ha Long Bay")),
            ("category", t("Natural")),
            ("date_inscribed", t("1994")),
            ("states", t("Viet Nam")),
            ("country", t("ignored")),
        ]))
        .unwrap();
        assert_eq!(r.category, Category::Natural);
        assert_eq!(r.year.as_deref(), Some("1994"));
        assert_eq!(r.country, "Viet Nam");

        let r = extract(&row(&[
            ("site", t("Y")),
            ("category", t("cultural")),
            ("year", t("2001.0")),
        ]))
        .unwrap();
        assert_eq!(r.category, Category::Mixed);
        assert_eq!(r.year.as_deref(), Some("2001.0"));

        let r = extract(&row(&[("site", t("Z")), ("year", t("c. 1990"))])).unwrap();
        assert_eq!(r.year, None);
        assert_eq!(r.category, Category::Mixed);
    }

    #[test]
    fn extract_all_counts_drops() {
        let rows = vec![
            row(&[("site", t("A"))]),
            row(&[("site", t(""))]),
            row(&[("site", t("B"))]),
        ];
        let (out, dropped) = extract_all(&rows);
        assert_eq!(out.len(), 2);
        assert_eq!(dropped, 1);
    }
}
