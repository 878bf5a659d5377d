use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{CoreError, Result};
use crate::services::output::write_json_atomic;

/// A key being present means the name is done, whatever its value. A failed
/// translation is stored as the English name itself and never retried.
#[derive(Debug, Clone)]
pub struct TranslationStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl TranslationStore {
    /// Loads `path` if it exists. An unreadable or corrupt file is an error:
    /// starting empty would overwrite earlier progress on the next flush.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
            if data.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&data).map_err(|e| CoreError::json(path, e))?
            }
        } else {
            BTreeMap::new()
        };

        debug!("[tm] {} entries loaded from {}", entries.len(), path.display());

        Ok(TranslationStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn in_memory(entries: BTreeMap<String, String>) -> Self {
        TranslationStore {
            path: PathBuf::new(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name.trim())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name.trim()).map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, translation: String) {
        self.entries.insert(name.trim().to_string(), translation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    pub fn flush(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        write_json_atomic(&self.path, &self.entries)?;
        info!("[tm] saved {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
