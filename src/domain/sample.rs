// ============================================================
// Layer 3 — Samples and Batches
// ============================================================
// The three shapes data takes on its way to the training loop:
//
//   TokenizedRow  — one row, rendered + tokenised, NOT padded
//   PaddedInputs  — output of the generic pad routine
//   PaddedBatch   — PaddedInputs plus labels (the collator's output)
//
// Batches are plain row-major Vec<Vec<u32>> here; the tensor
// flavour lives in the ml layer.

use serde::{Deserialize, Serialize};

/// One row of the table after permutation, rendering and tokenisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedRow {
    /// Token ids of the rendered sentence, unpadded
    pub input_ids: Vec<u32>,

    /// 1 for every token (there is no padding yet)
    pub attention_mask: Vec<u32>,

    /// The sentence that was tokenised, e.g. "city is Reno, age is 34"
    pub text: String,
}

impl TokenizedRow {
    pub fn new(input_ids: Vec<u32>, text: impl Into<String>) -> Self {
        let attention_mask = vec![1; input_ids.len()];
        Self { input_ids, attention_mask, text: text.into() }
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Right-padded token ids with their padding indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedInputs {
    /// shape: [batch_size, seq_len]
    pub input_ids: Vec<Vec<u32>>,

    /// shape: [batch_size, seq_len] — 1 = real token, 0 = padding
    pub attention_mask: Vec<Vec<u32>>,

    /// Real (unpadded, post-truncation) length of each row
    pub lengths: Vec<usize>,
}

impl PaddedInputs {
    pub fn batch_size(&self) -> usize {
        self.input_ids.len()
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }
}

/// A collated training batch. All three matrices share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaddedBatch {
    pub input_ids:      Vec<Vec<u32>>,
    pub attention_mask: Vec<Vec<u32>>,
    /// Independent copy of `input_ids` taken at collation time
    pub labels:         Vec<Vec<u32>>,
    pub lengths:        Vec<usize>,
}

impl PaddedBatch {
    pub fn batch_size(&self) -> usize {
        self.input_ids.len()
    }

    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }

    /// (batch_size, seq_len)
    pub fn shape(&self) -> (usize, usize) {
        (self.batch_size(), self.seq_len())
    }

    /// Fraction of positions that are padding
    pub fn pad_fraction(&self) -> f64 {
        let total = self.batch_size() * self.seq_len();
        if total == 0 {
            return 0.0;
        }
        let real: usize = self.lengths.iter().sum();
        (total - real) as f64 / total as f64
    }
}
