use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// Writes through a sibling temp file and a rename, so readers never see a
/// half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
    }

    fs::write(&tmp, bytes).map_err(|e| CoreError::io(&tmp, e))?;

    // rename replaces an existing target; the old file stays until then.
    fs::rename(&tmp, path).map_err(|e| CoreError::io(path, e))?;

    Ok(())
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())
}

pub fn backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let bak = sibling_with_suffix(path, "bak");
    fs::copy(path, &bak).map_err(|e| CoreError::io(&bak, e))?;
    info!("[output] previous {} saved as {}", path.display(), bak.display());

    Ok(Some(bak))
}

pub fn replace_json<T: Serialize>(path: &Path, value: &T) -> Result<Option<PathBuf>> {
    let bak = backup(path)?;
    write_json_atomic(path, value)?;
    Ok(bak)
}

fn tmp_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "tmp")
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "output".to_string(),
    };
    p.set_file_name(format!("{file_name}.{suffix}"));
    p
}
