use crate::data::datatable::{DataRow, DataValue, GenericDataType};
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Rows plus the column metadata needed to describe them
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    /// Name used as the default data-source id (file stem)
    pub name: String,
    pub columns: Vec<String>,
    /// Aligned with `columns` by position
    pub column_types: Vec<GenericDataType>,
    pub rows: Vec<DataRow>,
}

impl LoadedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Force the given columns to be treated as temporal (epoch millisecond columns
    /// look numeric to inference)
    pub fn mark_temporal(&mut self, names: &[String]) {
        for name in names {
            match self.columns.iter().position(|c| c == name) {
                Some(idx) => self.column_types[idx] = GenericDataType::Temporal,
                None => debug!(target: "loader", "Ignoring unknown temporal column '{}'", name),
            }
        }
    }

    fn infer_column_types(&mut self) {
        self.column_types = self
            .columns
            .iter()
            .map(|name| {
                GenericDataType::infer_from_values(
                    self.rows.iter().take(100).filter_map(|row| row.get(name)),
                )
            })
            .collect();
    }
}

/// Load a CSV file with a header line
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path.as_ref()))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: DataRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, raw)| (header.clone(), DataValue::from_raw(raw)))
            .collect();
        rows.push(row);
    }

    let mut table = LoadedTable {
        name: table_name(path.as_ref()),
        columns: headers,
        column_types: Vec::new(),
        rows,
    };
    table.infer_column_types();

    info!(target: "loader", "Loaded {} rows from CSV {:?}", table.row_count(), path.as_ref());
    Ok(table)
}

/// Load a JSON file holding an array of objects
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open JSON file: {:?}", path.as_ref()))?;
    let value: JsonValue = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON file: {:?}", path.as_ref()))?;

    let mut table = table_from_json(&value)?;
    table.name = table_name(path.as_ref());

    info!(target: "loader", "Loaded {} rows from JSON {:?}", table.row_count(), path.as_ref());
    Ok(table)
}

/// Build a table from an in-memory JSON array of objects.
/// Columns are the union of keys in first-seen order.
pub fn table_from_json(value: &JsonValue) -> Result<LoadedTable> {
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("JSON data must be an array of objects"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| anyhow!("Row {} is not a JSON object", idx))?;
        for key in obj.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
        if let Some(row) = DataRow::from_json(item) {
            rows.push(row);
        }
    }

    let mut table = LoadedTable {
        name: String::new(),
        columns,
        column_types: Vec::new(),
        rows,
    };
    table.infer_column_types();
    Ok(table)
}

/// Pick the loader from the file extension
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedTable> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") => load_csv(path),
        Some("json") => load_json(path),
        _ => Err(anyhow!(
            "Unsupported file type: {:?} (expected .csv or .json)",
            path.as_ref()
        )),
    }
}

/// File stem, used as the table name and default data-source id
pub fn table_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("data")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_table_from_json_collects_columns_in_order() {
        let data = json!([
            {"id": 1, "name": "alpha"},
            {"id": 2, "name": "beta", "extra": true}
        ]);
        let table = table_from_json(&data).unwrap();
        assert_eq!(table.columns, vec!["id", "name", "extra"]);
        assert_eq!(table.column_types[0], GenericDataType::Numeric);
        assert_eq!(table.column_types[2], GenericDataType::Boolean);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_table_from_json_rejects_non_objects() {
        assert!(table_from_json(&json!({"a": 1})).is_err());
        assert!(table_from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_load_csv_with_types() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,created,active,note").unwrap();
        writeln!(file, "1,2024-01-15 10:00:00,true,").unwrap();
        writeln!(file, "2,2024-01-16 11:30:00,false,hello").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, vec!["id", "created", "active", "note"]);
        assert_eq!(
            table.column_types,
            vec![
                GenericDataType::Numeric,
                GenericDataType::Temporal,
                GenericDataType::Boolean,
                GenericDataType::String,
            ]
        );
        assert_eq!(table.rows[0].get("note"), Some(&DataValue::Null));
    }

    #[test]
    fn test_mark_temporal_overrides_inference() {
        let data = json!([{"ts": 1700000000000i64, "v": 1}]);
        let mut table = table_from_json(&data).unwrap();
        assert_eq!(table.column_types[0], GenericDataType::Numeric);
        table.mark_temporal(&["ts".to_string(), "missing".to_string()]);
        assert_eq!(table.column_types[0], GenericDataType::Temporal);
        assert_eq!(table.column_types[1], GenericDataType::Numeric);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_file(file.path()).is_err());
    }
}
