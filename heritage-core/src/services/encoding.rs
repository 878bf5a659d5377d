use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use log::{debug, warn};
use serde::Serialize;

use crate::error::{CoreError, Result};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: String,
    pub had_errors: bool,
}

/// Reads a file of unknown charset. UTF-8 with or without BOM is taken as
/// is; anything else goes through detection. Decoding itself never fails.
pub fn read_text(path: &Path) -> Result<DecodedText> {
    let bytes = fs::read(path).map_err(|e| CoreError::io(path, e))?;
    let decoded = decode_bytes(&bytes);

    if decoded.had_errors {
        warn!(
            "[encoding] {} decoded as {} with replacement characters",
            path.display(),
            decoded.encoding
        );
    } else {
        debug!("[encoding] {} decoded as {}", path.display(), decoded.encoding);
    }

    Ok(decoded)
}

pub fn decode_bytes(bytes: &[u8]) -> DecodedText {
    // BOM UTF-8 (EF BB BF)
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return decode_with(rest, UTF_8, "utf-8-sig");
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: s.to_string(),
            encoding: "utf-8".into(),
            had_errors: false,
        };
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    decode_with(bytes, encoding, &encoding.name().to_lowercase())
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding, label: &str) -> DecodedText {
    let (text, _, had_errors) = encoding.decode(bytes);

    DecodedText {
        text: text.into_owned(),
        encoding: label.to_string(),
        had_errors,
    }
}
