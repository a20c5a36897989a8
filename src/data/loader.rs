// ============================================================
// Layer 4 — Table Loader
// ============================================================
// Reads the row-oriented table produced by the upstream data
// preparation step and builds a TabularStore from it.
//
// Accepted formats:
//   *.jsonl / *.ndjson   one flat JSON object per line
//   anything else        a JSON array of flat objects
//
//   {"age": 34, "city": "Reno", "zip": null}
//
// The first record fixes the schema (column names AND order,
// hence serde_json's preserve_order feature). Every later record
// must carry exactly the same keys.
//
// Value mapping:
//   integer → Int      float → Float     string → Text
//   bool    → Bool     null  → Missing   array/object → error
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::data::table::TabularStore;
use crate::domain::error::{FeedError, Result};
use crate::domain::traits::TableSource;
use crate::domain::value::CellValue;

/// Loads a table from a .json or .jsonl file
pub struct JsonTableLoader {
    path: PathBuf,
}

impl JsonTableLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_line_delimited(&self) -> bool {
        matches!(
            self.path.extension().and_then(|e| e.to_str()),
            Some("jsonl") | Some("ndjson")
        )
    }
}

impl TableSource for JsonTableLoader {
    fn load_table(&self) -> Result<TabularStore> {
        let content = fs::read_to_string(&self.path)?;

        let store = if self.is_line_delimited() {
            parse_json_lines(&content)?
        } else {
            parse_json_array(&content)?
        };

        tracing::info!(
            "Loaded {} rows x {} columns from '{}'",
            store.num_rows(),
            store.num_columns(),
            self.path.display()
        );
        Ok(store)
    }
}

/// Parse a JSON array of flat objects
pub fn parse_json_array(content: &str) -> Result<TabularStore> {
    let records: Vec<Map<String, Value>> = serde_json::from_str(content)?;
    build_store(records)
}

/// Parse one JSON object per non-blank line
pub fn parse_json_lines(content: &str) -> Result<TabularStore> {
    let records = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(serde_json::from_str::<Map<String, Value>>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    build_store(records)
}

fn build_store(records: Vec<Map<String, Value>>) -> Result<TabularStore> {
    let names: Vec<String> = records
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default();

    let mut rows = Vec::with_capacity(records.len());
    for (r, mut record) in records.into_iter().enumerate() {
        if record.len() != names.len() {
            return Err(FeedError::SchemaMismatch {
                row:      r,
                expected: format!("{} columns", names.len()),
                found:    format!("{} columns", record.len()),
            });
        }

        let mut row = Vec::with_capacity(names.len());
        for name in &names {
            let value = record.remove(name).ok_or_else(|| FeedError::SchemaMismatch {
                row:      r,
                expected: format!("column '{name}'"),
                found:    "no such key".to_string(),
            })?;
            row.push(to_cell(name, value)?);
        }
        rows.push(row);
    }

    TabularStore::from_rows(names, rows)
}

fn to_cell(column: &str, value: Value) -> Result<CellValue> {
    match value {
        Value::Null      => Ok(CellValue::Missing),
        Value::Bool(b)   => Ok(CellValue::Bool(b)),
        Value::String(s) => Ok(CellValue::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(CellValue::Int(i)),
            None    => Ok(n.as_f64().map_or(CellValue::Missing, CellValue::Float)),
        },
        Value::Array(_)  => Err(FeedError::UnsupportedValue {
            column: column.to_string(),
            kind:   "array".to_string(),
        }),
        Value::Object(_) => Err(FeedError::UnsupportedValue {
            column: column.to_string(),
            kind:   "object".to_string(),
        }),
    }
}
