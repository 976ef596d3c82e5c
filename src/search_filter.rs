use crate::data::datatable::{DataRow, DataValue};
use std::sync::Arc;
use tracing::trace;

/// Case-insensitive substring filter over rows.
///
/// The lowercase projection of every row is built once per row set (by `Arc`
/// identity) and reused for every keystroke until the rows change.
pub struct RowFilter {
    /// Stands in for null values, matched after lowercasing
    na_token: String,
    cache: Option<(Arc<Vec<DataRow>>, Vec<Vec<String>>)>,
}

impl RowFilter {
    pub fn new(na_token: impl Into<String>) -> Self {
        Self {
            na_token: na_token.into(),
            cache: None,
        }
    }

    /// Indices of rows matching `filter_text`, in original order
    pub fn matching_indices(&mut self, rows: &Arc<Vec<DataRow>>, filter_text: &str) -> Vec<usize> {
        if filter_text.is_empty() {
            return (0..rows.len()).collect();
        }

        let needle = filter_text.to_lowercase();
        let projection = self.projection(rows);

        let matches: Vec<usize> = projection
            .iter()
            .enumerate()
            .filter(|(_, values)| values.iter().any(|v| v.contains(&needle)))
            .map(|(idx, _)| idx)
            .collect();

        trace!(target: "filter", "'{}' matched {} of {} rows", filter_text, matches.len(), rows.len());
        matches
    }

    /// The matching rows themselves
    pub fn apply(&mut self, rows: &Arc<Vec<DataRow>>, filter_text: &str) -> Vec<DataRow> {
        self.matching_indices(rows, filter_text)
            .into_iter()
            .filter_map(|idx| rows.get(idx).cloned())
            .collect()
    }

    fn projection(&mut self, rows: &Arc<Vec<DataRow>>) -> &[Vec<String>] {
        let stale = !matches!(&self.cache, Some((cached, _)) if Arc::ptr_eq(cached, rows));
        if stale {
            let projected: Vec<Vec<String>> = rows
                .iter()
                .map(|row| row.values().map(|v| self.lowercase(v)).collect::<Vec<_>>())
                .collect();
            self.cache = Some((Arc::clone(rows), projected));
        }
        match &self.cache {
            Some((_, projected)) => projected,
            None => &[],
        }
    }

    fn lowercase(&self, value: &DataValue) -> String {
        match value {
            DataValue::Null => self.na_token.to_lowercase(),
            other => other.to_string().to_lowercase(),
        }
    }
}

impl Default for RowFilter {
    fn default() -> Self {
        Self::new("N/A")
    }
}
