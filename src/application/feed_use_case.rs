// ============================================================
// Layer 2 — FeedUseCase
// ============================================================
// Walks a table in batches, the way a training loop would
// consume it:
//
//   Step 1: Load the table                 (Layer 4 - data)
//   Step 2: Build / load the tokenizer     (Layer 6 - infra)
//   Step 3: Build the permuting dataset    (Layer 4 - data)
//   Step 4: Save the run config            (Layer 2)
//   Step 5: Fetch, collate, record batches (Layers 4, 5, 6)
//
// Every epoch over the table draws fresh column orders, so
// running it twice with no seed gives different sentences.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §4 (Datasets and Dataloaders)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use burn::backend::NdArray;
use serde::{Deserialize, Serialize};

use crate::data::{
    collator::{Collated, CollatorConfig, LabelCollator},
    dataset::{PermutingDataset, SerializerConfig},
    loader::JsonTableLoader,
    serializer::{RowSerializer, CLAUSE_SEPARATOR},
    table::TabularStore,
};
use crate::domain::selector::RowSelector;
use crate::domain::traits::{TableSource, TextTokenizer};
use crate::infra::{
    byte_tokenizer::ByteTokenizer,
    metrics::{BatchStats, MetricsLogger},
    tokenizer_store::TokenizerStore,
};

pub const CONFIG_FILE: &str = "feed_config.json";

// ─── Feed Configuration ───────────────────────────────────────────────────────
// Everything one run needs. Saved next to the batch statistics so a
// run can be reproduced from its output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub table:         String,
    /// None → byte-level tokenizer, no files needed
    pub tokenizer_dir: Option<String>,
    pub vocab_size:    usize,
    pub batch_size:    usize,
    pub epochs:        usize,
    pub out_dir:       String,
    pub serializer:    SerializerConfig,
    pub collator:      CollatorConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            table:         "data/table.jsonl".to_string(),
            tokenizer_dir: None,
            vocab_size:    8000,
            batch_size:    8,
            epochs:        1,
            out_dir:       "runs".to_string(),
            serializer:    SerializerConfig::default(),
            collator:      CollatorConfig::default(),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub batches:     usize,
    pub samples:     usize,
    pub max_seq_len: usize,
    pub stats_path:  PathBuf,
}

// ─── FeedUseCase ──────────────────────────────────────────────────────────────
pub struct FeedUseCase {
    config: FeedConfig,
}

impl FeedUseCase {
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<FeedSummary> {
        let cfg = &self.config;
        if cfg.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        // ── Step 1: Load the table ───────────────────────────────────────────
        let store = JsonTableLoader::new(&cfg.table)
            .load_table()
            .with_context(|| format!("Cannot load table '{}'", cfg.table))?;
        let store = Arc::new(store);

        // ── Step 2: Tokenizer ────────────────────────────────────────────────
        let tokenizer = self.build_tokenizer(&store)?;
        tracing::info!("Tokenizer ready (vocab_size={})", tokenizer.vocab_size());

        // ── Step 3: Dataset and collator ─────────────────────────────────────
        let dataset  = PermutingDataset::with_tokenizer(
            Arc::clone(&store),
            Arc::clone(&tokenizer),
            cfg.serializer.clone(),
        );
        let collator = LabelCollator::new(tokenizer, cfg.collator.clone());

        // ── Step 4: Save config ──────────────────────────────────────────────
        fs::create_dir_all(&cfg.out_dir)
            .with_context(|| format!("Cannot create '{}'", cfg.out_dir))?;
        save_config(Path::new(&cfg.out_dir), cfg)?;

        // ── Step 5: Batches ──────────────────────────────────────────────────
        let logger = MetricsLogger::new(&cfg.out_dir)?;
        let device = Default::default();
        let keys: Vec<usize> = (0..dataset.num_rows()).collect();

        let mut summary = FeedSummary {
            batches:     0,
            samples:     0,
            max_seq_len: 0,
            stats_path:  logger.csv_path().clone(),
        };

        for epoch in 0..cfg.epochs {
            for chunk in keys.chunks(cfg.batch_size) {
                let samples = dataset
                    .get_items(&RowSelector::keys(chunk.iter().copied()))
                    .with_context(|| format!("Cannot fetch rows {:?}", chunk))?;

                let stats = match collator.collate_as::<NdArray>(&samples, &device)? {
                    Collated::Tensor(batch) => BatchStats::from_tensors(summary.batches, &batch),
                    Collated::Plain(batch)  => BatchStats::from_batch(summary.batches, &batch),
                };
                logger.log(&stats)?;

                summary.batches    += 1;
                summary.samples    += stats.batch_size;
                summary.max_seq_len = summary.max_seq_len.max(stats.seq_len);
            }
            tracing::info!("Epoch {} done: {} batches so far", epoch + 1, summary.batches);
        }

        tracing::info!(
            "Collated {} samples into {} batches (longest {} tokens)",
            summary.samples,
            summary.batches,
            summary.max_seq_len
        );
        Ok(summary)
    }

    /// Byte tokenizer by default; a directory means load tokenizer.json
    /// from it, or build one from the table's sentences first.
    fn build_tokenizer(&self, store: &TabularStore) -> Result<Arc<dyn TextTokenizer>> {
        let Some(dir) = &self.config.tokenizer_dir else {
            return Ok(Arc::new(ByteTokenizer::new()));
        };

        let corpus    = corpus(store, &self.config.serializer.missing_token)?;
        let tokenizer = TokenizerStore::new(dir).load_or_build(&corpus, self.config.vocab_size)?;
        Ok(Arc::new(tokenizer))
    }
}

/// One sentence per row in schema order. Word counts do not depend on
/// clause order, so no permutation is needed here.
fn corpus(store: &TabularStore, missing_token: &str) -> Result<Vec<String>> {
    let serializer = RowSerializer::new(missing_token);
    (0..store.num_rows())
        .map(|i| {
            let row = store.row(i)?;
            Ok(serializer.clauses(&row).join(CLAUSE_SEPARATOR))
        })
        .collect()
}

fn save_config(dir: &Path, cfg: &FeedConfig) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(cfg)?;
    fs::write(&path, json)
        .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
    tracing::debug!("Saved config: '{}'", path.display());
    Ok(())
}
