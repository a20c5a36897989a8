// ============================================================
// Layer 4 — Permuting Dataset
// ============================================================
// Maps row selectors to tokenised samples. Every access draws a
// fresh column permutation, so the same row yields a different
// sentence each time it is read (data augmentation, on purpose).
//
//   selector ──► store.select_with() ──► [i, j, k]
//                                      │  for each index:
//                                      ▼
//                 row view ─► serializer.render(rng) ─► tokenizer.encode
//                                                          │
//                                                          ▼
//                                                  TokenizedRow (no padding)
//
// Random source: one StdRng behind a Mutex, seeded from config
// when reproducibility is needed, from OS entropy otherwise.
// The lock makes concurrent gets from loader worker threads safe;
// each get still receives its own independent draw.
//
// Tokenizer: prefer `with_tokenizer` (single-phase). `new` plus
// `set_tokenizer` is kept for harnesses that construct first
// and configure later; until then every read fails with
// NotConfigured before any row work is done.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

use std::sync::{Arc, Mutex, MutexGuard};

use burn::data::dataset::Dataset;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::data::serializer::RowSerializer;
use crate::data::table::TabularStore;
use crate::domain::error::{FeedError, Result};
use crate::domain::sample::TokenizedRow;
use crate::domain::selector::RowSelector;
use crate::domain::traits::TextTokenizer;
use crate::domain::value::DEFAULT_MISSING_TOKEN;

// ─── SerializerConfig ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Pins the permutation sequence; None draws from OS entropy
    pub seed: Option<u64>,

    /// Text rendered for missing / NaN cells
    pub missing_token: String,

    /// Let the tokenizer add its special tokens (e.g. BOS)
    pub add_special_tokens: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            seed:               None,
            missing_token:      DEFAULT_MISSING_TOKEN.to_string(),
            add_special_tokens: false,
        }
    }
}

impl SerializerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_missing_token(mut self, token: impl Into<String>) -> Self {
        self.missing_token = token.into();
        self
    }

    pub fn with_special_tokens(mut self, enabled: bool) -> Self {
        self.add_special_tokens = enabled;
        self
    }
}

// ─── PermutingDataset ─────────────────────────────────────────────────────────
pub struct PermutingDataset {
    store:              Arc<TabularStore>,
    tokenizer:          Option<Arc<dyn TextTokenizer>>,
    serializer:         RowSerializer,
    add_special_tokens: bool,
    rng:                Mutex<StdRng>,
}

impl PermutingDataset {
    /// Two-phase construction: call `set_tokenizer` before reading rows.
    pub fn new(store: Arc<TabularStore>, config: SerializerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self {
            store,
            tokenizer:          None,
            serializer:         RowSerializer::new(config.missing_token),
            add_special_tokens: config.add_special_tokens,
            rng:                Mutex::new(rng),
        }
    }

    /// Single-phase construction with the tokenizer in place.
    pub fn with_tokenizer(
        store:     Arc<TabularStore>,
        tokenizer: Arc<dyn TextTokenizer>,
        config:    SerializerConfig,
    ) -> Self {
        let mut dataset = Self::new(store, config);
        dataset.tokenizer = Some(tokenizer);
        dataset
    }

    pub fn set_tokenizer(&mut self, tokenizer: Arc<dyn TextTokenizer>) {
        self.tokenizer = Some(tokenizer);
    }

    pub fn tokenizer(&self) -> Option<&Arc<dyn TextTokenizer>> {
        self.tokenizer.as_ref()
    }

    pub fn store(&self) -> &TabularStore {
        &self.store
    }

    pub fn num_rows(&self) -> usize {
        self.store.num_rows()
    }

    /// One tokenised sample for row `index`.
    pub fn get(&self, index: usize) -> Result<TokenizedRow> {
        let tokenizer = self.configured_tokenizer()?;
        self.sample(index, tokenizer)
    }

    /// One tokenised sample per row the selector resolves to, in request order.
    pub fn get_items(&self, selector: &RowSelector) -> Result<Vec<TokenizedRow>> {
        let tokenizer = self.configured_tokenizer()?;
        let indices   = self.store.select_with(selector, self.serializer.missing_token())?;

        tracing::trace!("Serialising {} rows", indices.len());
        indices
            .into_iter()
            .map(|i| self.sample(i, tokenizer))
            .collect()
    }

    /// Render row `index` with a fresh permutation, without tokenising.
    pub fn render(&self, index: usize) -> Result<String> {
        let row = self.store.row(index)?;
        Ok(self.serializer.render(&row, &mut *self.lock_rng()))
    }

    fn sample(&self, index: usize, tokenizer: &dyn TextTokenizer) -> Result<TokenizedRow> {
        let text      = self.render(index)?;
        let input_ids = tokenizer.encode(&text, self.add_special_tokens)?;
        Ok(TokenizedRow::new(input_ids, text))
    }

    fn configured_tokenizer(&self) -> Result<&dyn TextTokenizer> {
        self.tokenizer.as_deref().ok_or(FeedError::NotConfigured)
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        // A panic while holding the lock leaves the RNG state intact
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ─── Burn Dataset Trait Implementation ────────────────────────────────────────
// Lets burn's DataLoader pull samples by index. Errors cannot be
// returned through this trait, so they are logged and the index is
// reported as absent.
impl Dataset<TokenizedRow> for PermutingDataset {
    fn get(&self, index: usize) -> Option<TokenizedRow> {
        match PermutingDataset::get(self, index) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!("Row {} unavailable: {}", index, e);
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.store.num_rows()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::selector::RowFilter;
    use crate::domain::value::CellValue;
    use crate::infra::byte_tokenizer::{ByteTokenizer, BOS_ID};
    use std::collections::HashSet;

    fn store() -> Arc<TabularStore> {
        Arc::new(
            TabularStore::from_rows(
                vec!["age".into(), "city".into(), "note".into()],
                vec![
                    vec![CellValue::Int(34), CellValue::from("Reno"), CellValue::from(" ")],
                    vec![CellValue::Int(51), CellValue::from("Boise"), CellValue::Missing],
                    vec![CellValue::Int(29), CellValue::from("Reno"), CellValue::from("x")],
                ],
            )
            .unwrap(),
        )
    }

    fn dataset(seed: u64) -> PermutingDataset {
        PermutingDataset::with_tokenizer(
            store(),
            Arc::new(ByteTokenizer::new()),
            SerializerConfig::default().with_seed(seed),
        )
    }

    fn clause_set(text: &str) -> HashSet<String> {
        text.split(", ").map(str::to_string).collect()
    }

    #[test]
    fn test_not_configured_before_any_row_work() {
        let ds = PermutingDataset::new(store(), SerializerConfig::default());
        assert!(matches!(ds.get(0), Err(FeedError::NotConfigured)));
        // Even an out-of-range selector reports the missing tokenizer first
        assert!(matches!(ds.get_items(&RowSelector::Index(99)), Err(FeedError::NotConfigured)));
    }

    #[test]
    fn test_set_tokenizer_enables_reads() {
        let mut ds = PermutingDataset::new(store(), SerializerConfig::default());
        ds.set_tokenizer(Arc::new(ByteTokenizer::new()));
        assert!(ds.get(0).is_ok());
    }

    #[test]
    fn test_one_past_end_is_out_of_range() {
        let ds = dataset(1);
        assert!(matches!(ds.get(3), Err(FeedError::OutOfRange { index: 3, len: 3 })));
        assert!(matches!(
            ds.get_items(&RowSelector::keys([0, 3])),
            Err(FeedError::OutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_round_trip_recovers_clause_set() {
        let ds     = dataset(3);
        let sample = ds.get(1).unwrap();
        let text   = ByteTokenizer::new().decode(&sample.input_ids).unwrap();

        let expected = clause_set("age is 51, city is Boise, note is None");
        assert_eq!(clause_set(&text), expected);
        assert_eq!(text, sample.text);
    }

    #[test]
    fn test_round_trip_through_built_tokenizer() {
        use crate::data::serializer::CLAUSE_SEPARATOR;
        use crate::infra::tokenizer_store::TokenizerStore;

        let table  = store();
        let rows   = RowSerializer::default();
        let corpus: Vec<String> = (0..table.num_rows())
            .map(|i| rows.clauses(&table.row(i).unwrap()).join(CLAUSE_SEPARATOR))
            .collect();

        let dir = std::env::temp_dir()
            .join(format!("tabular-lm-data-dataset-hf-{}", std::process::id()));
        let _   = std::fs::remove_dir_all(&dir);
        let tok: Arc<dyn TextTokenizer> =
            Arc::new(TokenizerStore::new(&dir).build_and_save(&corpus, 1000).unwrap());

        let ds = PermutingDataset::with_tokenizer(
            table,
            tok.clone(),
            SerializerConfig::default().with_seed(21).with_special_tokens(true),
        );
        for _ in 0..5 {
            for i in 0..3 {
                let sample = ds.get(i).unwrap();
                let text   = tok.decode(&sample.input_ids).unwrap();
                assert_eq!(text, sample.text);
                assert_eq!(clause_set(&text), clause_set(&corpus[i]));
            }
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_blank_value_clause_is_kept() {
        let ds = dataset(4);
        let s  = ds.get(0).unwrap();
        assert!(clause_set(&s.text).contains("note is "));
    }

    #[test]
    fn test_get_items_preserves_order_and_count() {
        let ds      = dataset(5);
        let samples = ds.get_items(&RowSelector::keys([2, 0, 2])).unwrap();
        assert_eq!(samples.len(), 3);
        assert!(samples[0].text.contains("age is 29"));
        assert!(samples[1].text.contains("age is 34"));
        assert!(samples[2].text.contains("age is 29"));
    }

    #[test]
    fn test_filter_with_no_match_yields_empty_list() {
        let ds  = dataset(6);
        let sel = RowSelector::Where(RowFilter::parse("city == 'Paris'").unwrap());
        assert!(ds.get_items(&sel).unwrap().is_empty());
    }

    #[test]
    fn test_filter_matches_configured_missing_token() {
        let ds = PermutingDataset::with_tokenizer(
            store(),
            Arc::new(ByteTokenizer::new()),
            SerializerConfig::default().with_missing_token("NA"),
        );
        let sel     = RowSelector::Where(RowFilter::parse("note == NA").unwrap());
        let samples = ds.get_items(&sel).unwrap();

        assert_eq!(samples.len(), 1);
        assert!(clause_set(&samples[0].text).contains("note is NA"));
    }

    #[test]
    fn test_range_yields_one_sample_per_row() {
        let ds = dataset(7);
        assert_eq!(ds.get_items(&RowSelector::Range(0..3)).unwrap().len(), 3);
        assert!(ds.get_items(&RowSelector::Range(1..1)).unwrap().is_empty());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = dataset(11);
        let b = dataset(11);
        for _ in 0..10 {
            assert_eq!(a.get(0).unwrap(), b.get(0).unwrap());
        }
    }

    #[test]
    fn test_repeated_access_varies_order() {
        let ds = dataset(12);
        let distinct: HashSet<String> = (0..100).map(|_| ds.get(2).unwrap().text).collect();
        // 3 columns → 6 orders, all reachable
        assert!(distinct.len() > 1);
        assert!(distinct.len() <= 6);
    }

    #[test]
    fn test_zero_column_row_policy() {
        let empty = Arc::new(TabularStore::with_row_count(Vec::new(), 1).unwrap());
        let tok: Arc<dyn TextTokenizer> = Arc::new(ByteTokenizer::new());

        let plain = PermutingDataset::with_tokenizer(empty.clone(), tok.clone(), SerializerConfig::default());
        let s = plain.get(0).unwrap();
        assert_eq!(s.text, "");
        assert!(s.input_ids.is_empty());

        let with_bos = PermutingDataset::with_tokenizer(
            empty,
            tok,
            SerializerConfig::default().with_special_tokens(true),
        );
        assert_eq!(with_bos.get(0).unwrap().input_ids, vec![BOS_ID]);
    }

    #[test]
    fn test_burn_dataset_trait() {
        let ds = dataset(13);
        assert_eq!(Dataset::len(&ds), 3);
        assert!(Dataset::get(&ds, 0).is_some());
        assert!(Dataset::get(&ds, 3).is_none());
    }

    #[test]
    fn test_concurrent_access() {
        let ds = Arc::new(dataset(14));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ds = Arc::clone(&ds);
                std::thread::spawn(move || {
                    (0..25).map(|_| ds.get(0).unwrap().text).collect::<Vec<_>>()
                })
            })
            .collect();

        let expected = clause_set("age is 34, city is Reno, note is ");
        for h in handles {
            for text in h.join().unwrap() {
                assert_eq!(clause_set(&text), expected);
            }
        }
    }
}
