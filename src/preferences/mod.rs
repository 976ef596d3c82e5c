//! Per-data-source column display preferences
//!
//! For every data source the store keeps an ordered set of column names whose
//! temporal values are shown as their raw original value.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, warn};

pub trait ColumnDisplayPreferenceStore: Send + Sync {
    /// Columns shown in original mode; unknown sources yield an empty list
    fn get(&self, data_source: &str) -> Vec<String>;

    /// Replace the stored list for `data_source`
    fn set(&self, data_source: &str, columns: &[String]) -> Result<()>;
}

/// Dedupe while keeping first-seen order
fn ordered_set(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !out.contains(column) {
            out.push(column.clone());
        }
    }
    out
}

#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ColumnDisplayPreferenceStore for InMemoryPreferenceStore {
    fn get(&self, data_source: &str) -> Vec<String> {
        match self.entries.read() {
            Ok(entries) => entries.get(data_source).cloned().unwrap_or_default(),
            Err(poisoned) => poisoned
                .into_inner()
                .get(data_source)
                .cloned()
                .unwrap_or_default(),
        }
    }

    fn set(&self, data_source: &str, columns: &[String]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow::anyhow!("preference store lock poisoned"))?;
        if columns.is_empty() {
            entries.remove(data_source);
        } else {
            entries.insert(data_source.to_string(), ordered_set(columns));
        }
        Ok(())
    }
}

/// JSON file store. Every `get` reads the file so changes written by another
/// handle (or another process) are picked up on the next re-sync.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, Vec<String>>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let entries = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {:?}", self.path))?;
        Ok(entries)
    }
}

impl ColumnDisplayPreferenceStore for FilePreferenceStore {
    fn get(&self, data_source: &str) -> Vec<String> {
        match self.load() {
            Ok(entries) => entries.get(data_source).cloned().unwrap_or_default(),
            Err(e) => {
                warn!(target: "preferences", "Ignoring unreadable preference file: {:#}", e);
                Vec::new()
            }
        }
    }

    fn set(&self, data_source: &str, columns: &[String]) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("preference file lock poisoned"))?;

        // A corrupt file is replaced rather than blocking every future write
        let mut entries = self.load().unwrap_or_default();
        if columns.is_empty() {
            entries.remove(data_source);
        } else {
            entries.insert(data_source.to_string(), ordered_set(columns));
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {:?}", self.path))?;

        debug!(target: "preferences", "Saved {} original columns for '{}'", columns.len(), data_source);
        Ok(())
    }
}
