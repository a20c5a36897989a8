// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two seams of the pipeline:
//
//   TableSource    — anything that can produce a TabularStore
//                    (JSON file loader, in-memory builders in tests)
//
//   TextTokenizer  — the tokenizer capability the dataset and the
//                    collator are generic over: encode, decode,
//                    pad id, vocabulary size, and a pad() routine
//
// Implementations of TextTokenizer:
//   - ByteTokenizer → one id per UTF-8 byte, no vocabulary file
//   - HfTokenizer   → wraps a HuggingFace tokenizers::Tokenizer
//   - test doubles in the unit tests

use crate::data::table::TabularStore;
use crate::domain::error::Result;
use crate::domain::padding::{pad_sequences, PadOptions};
use crate::domain::sample::{PaddedInputs, TokenizedRow};

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can load the row-oriented table the core consumes.
pub trait TableSource {
    fn load_table(&self) -> Result<TabularStore>;
}

// ─── TextTokenizer ────────────────────────────────────────────────────────────
/// Tokenizer capability used by the dataset and the collator.
///
/// `encode` never pads: padding is deferred to `pad`, which sees the
/// whole batch and therefore knows the real target length.
pub trait TextTokenizer: Send + Sync {
    /// Convert text to token ids, optionally adding special tokens.
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>>;

    /// Convert token ids back to text, skipping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Id used for padding positions
    fn pad_token_id(&self) -> u32;

    /// Number of distinct ids the tokenizer can emit
    fn vocab_size(&self) -> usize;

    /// Pad and stack a batch of samples. The default right-pads with
    /// `pad_token_id()`; implementations with other conventions can
    /// override it.
    fn pad(&self, samples: &[TokenizedRow], options: &PadOptions) -> Result<PaddedInputs> {
        pad_sequences(samples, options, self.pad_token_id())
    }
}
