// ============================================================
// Layer 3 — Row Selectors
// ============================================================
// Describes WHICH rows a caller wants. The store resolves a
// selector into ordinal indices; the dataset turns each index
// into one tokenised sample.
//
//   Index(3)          → row 3
//   Range(2..5)       → rows 2, 3, 4
//   Where(filter)     → every row the filter accepts (maybe none)
//   Many([..])        → each element in turn, results concatenated
//
// Filters come in two flavours: a column comparison that can be
// parsed from text ("city == 'Reno'") and an arbitrary closure.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::domain::error::{FeedError, Result};
use crate::domain::row::RowView;

/// Closure predicate over a row view
pub type RowPredicate = Arc<dyn Fn(&RowView<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum RowFilter {
    /// Compare the rendered, trimmed cell text of `column` with `value`.
    ColumnEquals {
        column: String,
        value:  String,
        negate: bool,
    },
    /// Any caller-supplied predicate
    Custom(RowPredicate),
}

impl RowFilter {
    /// Wrap a closure as a filter
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&RowView<'_>) -> bool + Send + Sync + 'static,
    {
        RowFilter::Custom(Arc::new(f))
    }

    /// Parse `column == value` or `column != value`.
    ///
    /// The value may be wrapped in single or double quotes; the
    /// quotes are stripped. Whitespace around both sides is ignored.
    /// Operators inside quoted text are not operators.
    pub fn parse(expr: &str) -> Result<Self> {
        let Some((at, negate)) = find_operator(expr) else {
            return Err(FeedError::InvalidFilter(format!(
                "expected '<column> == <value>' or '<column> != <value>', got '{expr}'"
            )));
        };
        let (column, value) = (&expr[..at], &expr[at + 2..]);

        let column = column.trim();
        if column.is_empty() {
            return Err(FeedError::InvalidFilter(format!("missing column name in '{expr}'")));
        }

        Ok(RowFilter::ColumnEquals {
            column: column.to_string(),
            value:  unquote(value.trim()).to_string(),
            negate,
        })
    }
}

/// Byte offset of the first `==` / `!=` outside quotes, and whether it negates.
fn find_operator(expr: &str) -> Option<(usize, bool)> {
    let bytes = expr.as_bytes();
    let mut quote: Option<u8> = None;

    for i in 0..bytes.len() {
        match (quote, bytes[i]) {
            (Some(q), b) if b == q        => quote = None,
            (Some(_), _)                  => {}
            (None, b @ (b'\'' | b'"'))    => quote = Some(b),
            (None, b @ (b'=' | b'!')) if bytes.get(i + 1) == Some(&b'=') => {
                return Some((i, b == b'!'));
            }
            (None, _) => {}
        }
    }
    None
}

fn unquote(s: &str) -> &str {
    for q in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

impl fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFilter::ColumnEquals { column, value, negate } => {
                let op = if *negate { "!=" } else { "==" };
                write!(f, "{column} {op} '{value}'")
            }
            RowFilter::Custom(_) => f.write_str("<custom predicate>"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RowSelector {
    Index(usize),
    Range(Range<usize>),
    Where(RowFilter),
    Many(Vec<RowSelector>),
}

impl RowSelector {
    /// Selector for a batch of ordinal keys, one sample each
    pub fn keys(keys: impl IntoIterator<Item = usize>) -> Self {
        RowSelector::Many(keys.into_iter().map(RowSelector::Index).collect())
    }
}

impl From<usize> for RowSelector {
    fn from(i: usize) -> Self { RowSelector::Index(i) }
}

impl From<Range<usize>> for RowSelector {
    fn from(r: Range<usize>) -> Self { RowSelector::Range(r) }
}

impl From<RowFilter> for RowSelector {
    fn from(f: RowFilter) -> Self { RowSelector::Where(f) }
}
