// ============================================================
// Layer 4 — Tabular Store
// ============================================================
// Immutable, column-oriented table handed to the core by the
// upstream data-preparation step.
//
// Layout:
//   columns: [ Column { name: "age",  values: [34, 51, ...] },
//              Column { name: "city", values: ["Reno", ...] } ]
//
// Invariants (checked once, at construction):
//   - column names are unique
//   - every column holds exactly `num_rows` values
//
// After construction nothing mutates the store, so it is shared
// between dataset instances and worker threads behind an Arc.

use crate::domain::error::{FeedError, Result};
use crate::domain::row::RowView;
use crate::domain::selector::{RowFilter, RowSelector};
use crate::domain::value::{CellValue, DEFAULT_MISSING_TOKEN};

/// One named column of cell values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name:   String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self { name: name.into(), values }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabularStore {
    columns:  Vec<Column>,
    num_rows: usize,
}

impl TabularStore {
    /// Build a store from columns, validating the schema invariants.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, |c| c.values.len());
        Self::with_row_count(columns, num_rows)
    }

    /// Like `from_columns`, but with an explicit row count. This is the
    /// only way to build a table whose rows have zero columns.
    pub fn with_row_count(columns: Vec<Column>, num_rows: usize) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(FeedError::DuplicateColumn(col.name.clone()));
            }
            if col.values.len() != num_rows {
                return Err(FeedError::SchemaMismatch {
                    row:      col.values.len().min(num_rows),
                    expected: format!("{num_rows} values in column '{}'", col.name),
                    found:    format!("{} values", col.values.len()),
                });
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Build a store from row-major records that share one schema.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let num_rows    = rows.len();
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|n| Column::new(n, Vec::with_capacity(num_rows)))
            .collect();

        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(FeedError::SchemaMismatch {
                    row:      r,
                    expected: format!("{} columns", columns.len()),
                    found:    format!("{} columns", row.len()),
                });
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }

        Self::with_row_count(columns, num_rows)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Borrow row `index`. Fails with `OutOfRange` past the last row.
    pub fn row(&self, index: usize) -> Result<RowView<'_>> {
        if index >= self.num_rows {
            return Err(FeedError::OutOfRange { index, len: self.num_rows });
        }

        let names  = self.columns.iter().map(|c| c.name.as_str()).collect();
        let values = self.columns.iter().map(|c| &c.values[index]).collect();
        Ok(RowView::new(index, names, values))
    }

    /// Resolve a selector into ordinal row indices, in request order.
    /// Filters see missing cells as the default sentinel.
    pub fn select(&self, selector: &RowSelector) -> Result<Vec<usize>> {
        self.select_with(selector, DEFAULT_MISSING_TOKEN)
    }

    /// Like `select`, with filters comparing missing cells as `missing_token`.
    pub fn select_with(&self, selector: &RowSelector, missing_token: &str) -> Result<Vec<usize>> {
        let mut out = Vec::new();
        self.select_into(selector, missing_token, &mut out)?;
        Ok(out)
    }

    fn select_into(
        &self,
        selector:      &RowSelector,
        missing_token: &str,
        out:           &mut Vec<usize>,
    ) -> Result<()> {
        match selector {
            RowSelector::Index(i) => {
                if *i >= self.num_rows {
                    return Err(FeedError::OutOfRange { index: *i, len: self.num_rows });
                }
                out.push(*i);
            }
            RowSelector::Range(range) => {
                if range.end > self.num_rows {
                    return Err(FeedError::OutOfRange { index: range.end, len: self.num_rows });
                }
                out.extend(range.clone());
            }
            RowSelector::Where(filter) => {
                out.extend(self.filter_with(filter, missing_token)?);
            }
            RowSelector::Many(items) => {
                for item in items {
                    self.select_into(item, missing_token, out)?;
                }
            }
        }
        Ok(())
    }

    /// Indices of every row the filter accepts. An empty result is not an error.
    pub fn filter(&self, filter: &RowFilter) -> Result<Vec<usize>> {
        self.filter_with(filter, DEFAULT_MISSING_TOKEN)
    }

    /// Column comparisons match against the rendered cell text, so a
    /// missing cell equals `missing_token`.
    pub fn filter_with(&self, filter: &RowFilter, missing_token: &str) -> Result<Vec<usize>> {
        match filter {
            RowFilter::ColumnEquals { column, value, negate } => {
                let col = self
                    .column(column)
                    .ok_or_else(|| FeedError::UnknownColumn(column.clone()))?;
                Ok(col
                    .values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| (v.render(missing_token).trim() == value) != *negate)
                    .map(|(i, _)| i)
                    .collect())
            }
            RowFilter::Custom(pred) => {
                let mut hits = Vec::new();
                for i in 0..self.num_rows {
                    if pred(&self.row(i)?) {
                        hits.push(i);
                    }
                }
                Ok(hits)
            }
        }
    }
}
