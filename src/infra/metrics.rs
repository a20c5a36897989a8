// ============================================================
// Layer 6 — Batch Statistics Logger
// ============================================================
// Records the shape of every collated batch to a CSV file so
// padding overhead can be inspected after a run.
//
// Columns recorded per batch:
//   - batch:        index of the batch (starts at 0)
//   - batch_size:   number of samples in the batch
//   - seq_len:      padded length of the batch
//   - real_tokens:  tokens that are not padding
//   - pad_fraction: share of positions that are padding
//
// Output file: <out_dir>/batch_stats.csv
//
// Example CSV output:
//   batch,batch_size,seq_len,real_tokens,pad_fraction
//   0,8,64,431,0.158203
//   1,8,72,502,0.128472
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use burn::prelude::*;
use burn::tensor::ElementConversion;
use serde::{Deserialize, Serialize};

use crate::domain::sample::PaddedBatch;
use crate::ml::batch::LmBatch;

pub const STATS_FILE: &str = "batch_stats.csv";

/// One row of the statistics CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    pub batch:        usize,
    pub batch_size:   usize,
    pub seq_len:      usize,
    pub real_tokens:  usize,
    pub pad_fraction: f64,
}

impl BatchStats {
    pub fn from_batch(batch_index: usize, batch: &PaddedBatch) -> Self {
        Self {
            batch:        batch_index,
            batch_size:   batch.batch_size(),
            seq_len:      batch.seq_len(),
            real_tokens:  batch.lengths.iter().sum(),
            pad_fraction: batch.pad_fraction(),
        }
    }

    /// Same figures read back from the tensor form; the mask sum
    /// counts the real tokens.
    pub fn from_tensors<B: Backend>(batch_index: usize, batch: &LmBatch<B>) -> Self {
        let [batch_size, seq_len] = batch.dims();
        let total = batch_size * seq_len;

        let real_tokens = if total == 0 {
            0
        } else {
            let sum: i64 = batch.attention_mask.clone().sum().into_scalar().elem();
            sum as usize
        };

        let pad_fraction = if total == 0 {
            0.0
        } else {
            (total - real_tokens) as f64 / total as f64
        };

        Self { batch: batch_index, batch_size, seq_len, real_tokens, pad_fraction }
    }
}

/// Appends batch statistics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is new.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join(STATS_FILE);

        // Appending to an existing log keeps earlier runs
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "batch,batch_size,seq_len,real_tokens,pad_fraction")?;
            tracing::debug!("Created stats CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &BatchStats) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{},{:.6}",
            s.batch,
            s.batch_size,
            s.seq_len,
            s.real_tokens,
            s.pad_fraction,
        )?;

        tracing::debug!(
            "Logged batch {}: {} x {}, pad_fraction={:.3}",
            s.batch,
            s.batch_size,
            s.seq_len,
            s.pad_fraction,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
