use chrono::{DateTime, Utc};

/// Canonical "database datetime" pattern used for temporal cells
pub const DATABASE_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Formats numeric timestamps for display
pub trait TimeFormatter: Send + Sync {
    /// `millis` is milliseconds since the Unix epoch
    fn format(&self, millis: i64) -> String;
}

/// Formats epoch milliseconds in UTC with a fixed strftime pattern
#[derive(Debug, Clone)]
pub struct DatabaseDateTimeFormatter {
    pattern: String,
}

impl DatabaseDateTimeFormatter {
    pub fn new() -> Self {
        Self::with_pattern(DATABASE_DATETIME)
    }

    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Default for DatabaseDateTimeFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeFormatter for DatabaseDateTimeFormatter {
    fn format(&self, millis: i64) -> String {
        match DateTime::<Utc>::from_timestamp_millis(millis) {
            Some(dt) => dt.format(&self.pattern).to_string(),
            // Out of chrono's range, show the raw number
            None => millis.to_string(),
        }
    }
}
