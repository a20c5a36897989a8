// ============================================================
// Layer 3 — Row View
// ============================================================
// A borrowed view of one row of the tabular store: the column
// names and the cell values, both in schema order.
//
// The view never copies cell data — it holds references into
// the store, which stays immutable for its whole lifetime.

use crate::domain::value::CellValue;

/// One row of a table, borrowed from the store.
#[derive(Debug, Clone)]
pub struct RowView<'a> {
    /// Ordinal position of this row in the store
    pub index: usize,

    /// Column names in schema order
    pub names: Vec<&'a str>,

    /// Cell values, aligned 1:1 with `names`
    pub values: Vec<&'a CellValue>,
}

impl<'a> RowView<'a> {
    pub fn new(index: usize, names: Vec<&'a str>, values: Vec<&'a CellValue>) -> Self {
        Self { index, names, values }
    }

    /// Number of columns in this row
    pub fn width(&self) -> usize {
        self.names.len()
    }

    /// Look up a cell by column name
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        self.names
            .iter()
            .position(|&n| n == column)
            .map(|i| self.values[i])
    }

    /// Iterate (name, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }
}
