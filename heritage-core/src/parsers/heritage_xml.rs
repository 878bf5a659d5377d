use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use log::{debug, warn};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::model::row::{RawRow, RawValue, ATTR_PREFIX, TEXT_KEY};

#[derive(Debug, Serialize, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_found: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
}

fn bare_amp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:(amp|lt|gt|quot|apos|#[0-9]+|#[xX][0-9a-fA-F]+);)?").unwrap()
    })
}

fn row_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<row(?:\s[^>]*)?>").unwrap())
}

fn row_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</row\s*>").unwrap())
}

/// Cuts `xml` into one fragment per `<row>` start tag. A fragment ends at its
/// own `</row>` or, when that is missing, right before the next `<row>`.
fn row_fragments(xml: &str) -> Vec<&str> {
    let starts: Vec<usize> = row_open_re().find_iter(xml).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let limit = starts.get(i + 1).copied().unwrap_or(xml.len());
            let segment = &xml[start..limit];
            match row_close_re().find(segment) {
                Some(close) => &segment[..close.end()],
                None => segment,
            }
        })
        .collect()
}

pub fn escape_bare_ampersands(xml: &str) -> String {
    bare_amp_re()
        .replace_all(xml, |caps: &Captures| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                "&amp;".to_string()
            }
        })
        .into_owned()
}

/// Recovers every `<row>` it can from `xml`. A row that fails to parse is
/// logged and skipped without affecting its siblings.
pub fn parse(xml: &str) -> (Vec<RawRow>, IngestReport) {
    let escaped = escape_bare_ampersands(xml);

    let mut report = IngestReport::default();
    let mut rows = Vec::new();

    for (i, fragment) in row_fragments(&escaped).into_iter().enumerate() {
        report.rows_found += 1;

        match parse_row(fragment) {
            Ok(row) => {
                rows.push(row);
                report.rows_parsed += 1;
            }
            Err(e) => {
                warn!("[ingest] skipping malformed row #{}: {e}", i + 1);
                report.rows_skipped += 1;
            }
        }
    }

    debug!(
        "[ingest] found={} parsed={} skipped={}",
        report.rows_found, report.rows_parsed, report.rows_skipped
    );

    (rows, report)
}

#[derive(Default)]
struct Element {
    name: String,
    text: String,
    attrs: Vec<(String, String)>,
    children: Vec<(String, RawValue)>,
}

impl Element {
    fn open(start: &BytesStart) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
        let mut attrs = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attrs.push((key, value.into_owned()));
        }

        Ok(Element {
            name,
            attrs,
            ..Default::default()
        })
    }

    fn close(self) -> (String, RawValue) {
        let text = self.text.trim().to_string();

        if self.attrs.is_empty() && self.children.is_empty() {
            return (self.name, RawValue::Text(text));
        }

        let mut map = BTreeMap::new();
        for (k, v) in self.attrs {
            map.insert(format!("{ATTR_PREFIX}{k}"), RawValue::Text(v));
        }
        group_children(&mut map, self.children);
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), RawValue::Text(text));
        }

        (self.name, RawValue::Node(map))
    }
}

/// Repeated child names collapse into a list, in document order.
fn group_children(map: &mut BTreeMap<String, RawValue>, children: Vec<(String, RawValue)>) {
    for (name, value) in children {
        match map.remove(&name) {
            None => {
                map.insert(name, value);
            }
            Some(RawValue::List(mut items)) => {
                items.push(value);
                map.insert(name, RawValue::List(items));
            }
            Some(existing) => {
                map.insert(name, RawValue::List(vec![existing, value]));
            }
        }
    }
}

fn parse_row(fragment: &str) -> Result<RawRow, String> {
    let mut reader = Reader::from_str(fragment);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut finished: Option<RawValue> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => {
                stack.push(Element::open(&e)?);
            }
            Event::Empty(e) => {
                let (name, value) = Element::open(&e)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.children.push((name, value)),
                    None => finished = Some(value),
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                if let Some(cur) = stack.last_mut() {
                    append_text(&mut cur.text, &text);
                }
            }
            Event::CData(e) => {
                // CDATA went through the ampersand pre-pass too.
                let raw = e.into_inner();
                let raw = String::from_utf8_lossy(&raw);
                let text = unescape(&raw).unwrap_or(Cow::Borrowed(raw.as_ref()));
                if let Some(cur) = stack.last_mut() {
                    append_text(&mut cur.text, &text);
                }
            }
            Event::End(_) => {
                let el = stack.pop().ok_or_else(|| "unbalanced end tag".to_string())?;
                let (name, value) = el.close();
                match stack.last_mut() {
                    Some(parent) => parent.children.push((name, value)),
                    None => finished = Some(value),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }

    match finished {
        Some(RawValue::Node(fields)) => Ok(RawRow { fields }),
        Some(_) => Ok(RawRow::default()),
        None => Err("row element not found".into()),
    }
}

fn append_text(buf: &mut String, text: &str) {
    let t = text.trim();
    if t.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push(' ');
    }
    buf.push_str(t);
}
