// ============================================================
// Layer 3 — Cell Values
// ============================================================
// A single scalar cell of the table. Upstream normalisation is
// expected to have flattened everything to one of these kinds;
// nested values are rejected by the loader.
//
// Display rules (what ends up after "<name> is "):
//   Int     → decimal                      34
//   Float   → shortest round-trip form     0.5, 34.0
//   Bool    → true / false
//   Text    → verbatim (trimmed later by the serializer)
//   Missing → the configured sentinel      None
//
// NaN floats count as missing.

use serde::{Deserialize, Serialize};

/// Sentinel rendered for missing cells unless configured otherwise.
pub const DEFAULT_MISSING_TOKEN: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl CellValue {
    /// True for explicit missing cells and NaN floats
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Missing  => true,
            CellValue::Float(f) => f.is_nan(),
            _                   => false,
        }
    }

    /// Display string of this value, using `missing_token` for gaps.
    pub fn render(&self, missing_token: &str) -> String {
        if self.is_missing() {
            return missing_token.to_string();
        }
        match self {
            CellValue::Int(i)   => i.to_string(),
            CellValue::Float(f) => render_float(*f),
            CellValue::Bool(b)  => b.to_string(),
            CellValue::Text(s)  => s.clone(),
            CellValue::Missing  => missing_token.to_string(),
        }
    }

    /// Short kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Int(_)   => "int",
            CellValue::Float(_) => "float",
            CellValue::Bool(_)  => "bool",
            CellValue::Text(_)  => "text",
            CellValue::Missing  => "missing",
        }
    }
}

fn render_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(DEFAULT_MISSING_TOKEN))
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self { CellValue::Int(v) }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self { CellValue::Float(v) }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self { CellValue::Bool(v) }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self { CellValue::Text(v.to_string()) }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self { CellValue::Text(v) }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Missing)
    }
}
