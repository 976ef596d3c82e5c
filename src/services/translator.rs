use std::collections::HashMap;

/// Label keys used by the table UI
pub mod labels {
    pub const SEARCH: &str = "Search";
    pub const COPY: &str = "Copy";
    pub const COLUMN_FORMATTING: &str = "Column Formatting";
    pub const FORMATTED_DATE: &str = "Formatted date";
    pub const ORIGINAL_VALUE: &str = "Original value";
    pub const NOT_APPLICABLE: &str = "N/A";
}

/// Looks up localized strings for static labels
pub trait Translator: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// Translator backed by a flat key -> label map; unknown keys translate to themselves
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    labels: HashMap<String, String>,
}

impl LabelCatalog {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }
}

impl Translator for LabelCatalog {
    fn t(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
