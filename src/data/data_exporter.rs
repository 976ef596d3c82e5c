use crate::data::datatable::{DataRow, DataValue};

/// Serializes visible table data into clipboard-friendly text
pub struct DataExporter;

impl DataExporter {
    /// Format a single value for a TSV field. Nulls and absent values become
    /// empty fields; tabs and line breaks are flattened so the grid shape
    /// survives pasting into a spreadsheet.
    pub fn format_for_clipboard(value: Option<&DataValue>) -> String {
        match value {
            None | Some(DataValue::Null) => String::new(),
            Some(DataValue::String(s)) => Self::flatten_field(s),
            Some(other) => other.to_string(),
        }
    }

    /// One row as tab-separated values, in `columns` order
    pub fn format_row_for_clipboard(row: &DataRow, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| Self::format_for_clipboard(row.get(column)))
            .collect::<Vec<_>>()
            .join("\t")
    }

    /// Generate TSV (Tab-Separated Values) text: a header line with the column
    /// names followed by one line per row. Empty column list yields an empty payload.
    pub fn generate_tsv_text<'a>(
        rows: impl IntoIterator<Item = &'a DataRow>,
        columns: &[String],
    ) -> String {
        if columns.is_empty() {
            return String::new();
        }

        let header: Vec<String> = columns.iter().map(|c| Self::flatten_field(c)).collect();
        let mut tsv_text = header.join("\t");
        tsv_text.push('\n');

        for row in rows {
            tsv_text.push_str(&Self::format_row_for_clipboard(row, columns));
            tsv_text.push('\n');
        }

        tsv_text
    }

    fn flatten_field(field: &str) -> String {
        field.replace('\t', " ").replace("\r\n", " ").replace(['\n', '\r'], " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tsv_preserves_column_and_row_order() {
        let rows = vec![
            DataRow::new()
                .with("b", DataValue::Integer(2))
                .with("a", DataValue::String("x".to_string())),
            DataRow::new()
                .with("a", DataValue::String("y".to_string()))
                .with("b", DataValue::Float(2.5)),
        ];
        let text = DataExporter::generate_tsv_text(&rows, &cols(&["a", "b"]));
        assert_eq!(text, "a\tb\nx\t2\ny\t2.5\n");
    }

    #[test]
    fn test_absent_and_null_values_are_empty_fields() {
        let rows = vec![DataRow::new()
            .with("a", DataValue::Null)
            .with("c", DataValue::Boolean(true))];
        let text = DataExporter::generate_tsv_text(&rows, &cols(&["a", "b", "c"]));
        assert_eq!(text, "a\tb\tc\n\t\ttrue\n");
    }

    #[test]
    fn test_embedded_separators_are_flattened() {
        let rows = vec![DataRow::new().with("a", DataValue::String("one\ttwo\nthree".to_string()))];
        let text = DataExporter::generate_tsv_text(&rows, &cols(&["a"]));
        assert_eq!(text, "a\none two three\n");
    }

    #[test]
    fn test_no_columns_no_payload() {
        let rows = vec![DataRow::new().with("a", DataValue::Integer(1))];
        assert_eq!(DataExporter::generate_tsv_text(&rows, &[]), "");
    }
}
