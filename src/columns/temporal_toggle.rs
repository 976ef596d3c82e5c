use crate::preferences::ColumnDisplayPreferenceStore;
use crate::trace_toggle;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a temporal column's values are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    /// Numeric timestamps rendered with the canonical datetime pattern
    Formatted,
    /// The raw value as stored
    Original,
}

/// Local cache of the display preferences for the active data source, plus
/// the transitions that keep it and the external store in step.
pub struct ColumnFormattingState {
    store: Arc<dyn ColumnDisplayPreferenceStore>,
    data_source: Option<String>,
    original_columns: Vec<String>,
    visible: bool,
    /// Bumped whenever `original_columns` may have changed
    generation: u64,
}

impl ColumnFormattingState {
    pub fn new(store: Arc<dyn ColumnDisplayPreferenceStore>) -> Self {
        Self {
            store,
            data_source: None,
            original_columns: Vec::new(),
            visible: false,
            generation: 0,
        }
    }

    pub fn data_source(&self) -> Option<&str> {
        self.data_source.as_deref()
    }

    pub fn has_data_source(&self) -> bool {
        self.data_source.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn original_columns(&self) -> &[String] {
        &self.original_columns
    }

    /// Switch the active data source; a change re-reads the store
    pub fn set_data_source(&mut self, data_source: Option<String>) {
        if self.data_source == data_source {
            return;
        }
        debug!(target: "column_format", "Data source changed: {:?} -> {:?}", self.data_source, data_source);
        self.data_source = data_source;
        self.resync();
    }

    /// Track table visibility; becoming visible again re-reads the store
    pub fn set_visible(&mut self, visible: bool) {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        if became_visible {
            self.resync();
        }
    }

    /// Reload the cached set from the external store
    pub fn resync(&mut self) {
        self.original_columns = match &self.data_source {
            Some(source) => self.store.get(source),
            None => Vec::new(),
        };
        self.generation += 1;
    }

    pub fn mode_of(&self, column: &str) -> DisplayMode {
        if self.is_original(column) {
            DisplayMode::Original
        } else {
            DisplayMode::Formatted
        }
    }

    pub fn is_original(&self, column: &str) -> bool {
        self.original_columns.iter().any(|c| c == column)
    }

    /// Apply a user choice. Returns true if the state changed.
    ///
    /// Selecting the mode that is already active does nothing, and so does
    /// any selection while no data source is known.
    pub fn select(&mut self, column: &str, mode: DisplayMode) -> bool {
        let Some(source) = self.data_source.clone() else {
            return false;
        };
        if self.mode_of(column) == mode {
            return false;
        }

        match mode {
            DisplayMode::Original => self.original_columns.push(column.to_string()),
            DisplayMode::Formatted => self.original_columns.retain(|c| c != column),
        }
        self.generation += 1;
        trace_toggle!(source, column, mode);

        // Local state has already moved; a failed write only loses persistence
        if let Err(e) = self.store.set(&source, &self.original_columns) {
            warn!(target: "column_format", "Failed to persist display preference for '{}': {:#}", source, e);
        }
        true
    }

    /// Flip between the two modes
    pub fn toggle(&mut self, column: &str) -> bool {
        let next = match self.mode_of(column) {
            DisplayMode::Formatted => DisplayMode::Original,
            DisplayMode::Original => DisplayMode::Formatted,
        };
        self.select(column, next)
    }
}
