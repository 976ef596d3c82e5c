use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Coarse type tag for a column, independent of how its values are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenericDataType {
    Numeric,
    String,
    Temporal,
    Boolean,
}

impl GenericDataType {
    /// Infer the generic type of a single raw string value
    pub fn infer_from_string(value: &str) -> Option<Self> {
        if value.is_empty() || value.eq_ignore_ascii_case("null") {
            return None;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return Some(GenericDataType::Boolean);
        }

        if value.parse::<f64>().is_ok() {
            return Some(GenericDataType::Numeric);
        }

        if looks_like_datetime(value) {
            return Some(GenericDataType::Temporal);
        }

        Some(GenericDataType::String)
    }

    /// Infer the generic type of a column from the values it holds.
    /// Nulls are ignored; disagreeing values fall back to String.
    pub fn infer_from_values<'a>(values: impl IntoIterator<Item = &'a DataValue>) -> Self {
        let mut inferred: Option<GenericDataType> = None;

        for value in values {
            let current = match value {
                DataValue::Null => continue,
                DataValue::Boolean(_) => GenericDataType::Boolean,
                DataValue::Integer(_) | DataValue::Float(_) => GenericDataType::Numeric,
                DataValue::String(s) => {
                    if looks_like_datetime(s) {
                        GenericDataType::Temporal
                    } else {
                        GenericDataType::String
                    }
                }
            };

            inferred = match inferred {
                None => Some(current),
                Some(existing) if existing == current => Some(existing),
                Some(_) => return GenericDataType::String,
            };
        }

        inferred.unwrap_or(GenericDataType::String)
    }
}

impl fmt::Display for GenericDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenericDataType::Numeric => "numeric",
            GenericDataType::String => "string",
            GenericDataType::Temporal => "temporal",
            GenericDataType::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// Date-ish strings: `2024-01-15`, `2024-01-15 10:30:00`, `2024-01-15T10:30:00Z`
fn looks_like_datetime(value: &str) -> bool {
    if value.len() < 10 {
        return false;
    }
    let bytes = value.as_bytes();
    bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// A single cell value in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl DataValue {
    /// Parse a raw text cell (CSV) into the narrowest matching value
    pub fn from_raw(s: &str) -> Self {
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return DataValue::Null;
        }
        if s.eq_ignore_ascii_case("true") {
            return DataValue::Boolean(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return DataValue::Boolean(false);
        }
        if let Ok(i) = s.parse::<i64>() {
            return DataValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return DataValue::Float(f);
        }
        DataValue::String(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, DataValue::String(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataValue::Integer(_) | DataValue::Float(_))
    }

    /// Numeric value as epoch milliseconds, truncating fractions
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            DataValue::Integer(i) => Some(*i),
            DataValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            _ => None,
        }
    }

    /// Ordering used for client-side sorting: nulls first, then booleans,
    /// numbers and strings. Mixed numerics compare by value.
    pub fn compare(&self, other: &DataValue) -> Ordering {
        fn rank(v: &DataValue) -> u8 {
            match v {
                DataValue::Null => 0,
                DataValue::Boolean(_) => 1,
                DataValue::Integer(_) | DataValue::Float(_) => 2,
                DataValue::String(_) => 3,
            }
        }

        match (self, other) {
            (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),
            (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
            (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let x = a.as_f64().unwrap_or(0.0);
                let y = b.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Null => write!(f, "null"),
        }
    }
}

impl From<&JsonValue> for DataValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else {
                    DataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            // Nested structures are shown as their JSON text
            other => DataValue::String(other.to_string()),
        }
    }
}

/// A row of data keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRow {
    values: HashMap<String, DataValue>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: DataValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: DataValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.values.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a row from a JSON object; anything else yields None
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let obj = value.as_object()?;
        let mut row = DataRow::new();
        for (key, value) in obj {
            row.insert(key.clone(), DataValue::from(value));
        }
        Some(row)
    }
}

impl<K: Into<String>> FromIterator<(K, DataValue)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (K, DataValue)>>(iter: I) -> Self {
        let mut row = DataRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}
