// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the row accessor and the collator can report.
// None of these are transient: they point at a configuration
// or programmer error, so they are surfaced to the caller as-is
// and never retried.
//
//   NotConfigured   — no tokenizer set on the accessor
//   OutOfRange      — selector points past the last row
//   EmptyBatch      — collator called with zero samples
//   SchemaMismatch  — a row disagrees with the table schema

use thiserror::Error;

/// Result alias used by the library layers (3–6).
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The accessor was asked for rows before a tokenizer was set.
    #[error("tokenizer not configured: call set_tokenizer() before reading rows")]
    NotConfigured,

    /// An ordinal index or range end lies past the end of the table.
    #[error("row index {index} out of range for table with {len} rows")]
    OutOfRange { index: usize, len: usize },

    /// The collator has no samples to derive a batch length from.
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    /// A row (or column) does not match the schema of the table.
    #[error("schema mismatch at row {row}: expected {expected}, found {found}")]
    SchemaMismatch {
        row:      usize,
        expected: String,
        found:    String,
    },

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("invalid filter expression: {0}")]
    InvalidFilter(String),

    /// Padding was disabled but the samples have different lengths.
    #[error("unpadded batch is ragged: expected length {expected}, found {found}")]
    RaggedBatch { expected: usize, found: usize },

    #[error("unsupported {kind} value in column '{column}'")]
    UnsupportedValue { column: String, kind: String },

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// burn Int tensors hold i32; larger ids cannot be represented.
    #[error("token id {0} does not fit in an i32 tensor element")]
    TokenIdOverflow(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = FeedError::OutOfRange { index: 3, len: 3 };
        assert_eq!(err.to_string(), "row index 3 out of range for table with 3 rows");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FeedError = io_err.into();
        assert!(matches!(err, FeedError::Io(_)));
    }
}
