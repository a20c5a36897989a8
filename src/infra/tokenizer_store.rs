// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Loads a HuggingFace tokenizer.json from disk, or builds a
// word-level one from the rendered row sentences and saves it.
//
// The vocabulary is built by hand and written as tokenizer JSON,
// then loaded back with Tokenizer::from_file. This sidesteps the
// Trainer/ModelWrapper type constraints of train_from_files in
// tokenizers 0.15.
//
// Pre-tokenisation is Metaspace followed by isolated punctuation.
// Spaces become "▁" and stay attached to the next piece, so the
// Metaspace decoder gives back the exact sentence:
//   "city is Reno, age is 0.5"
//   ▁city | ▁is | ▁Reno | , | ▁age | ▁is | ▁0 | . | 5
//
// Special tokens (fixed ids):
//   [PAD] 0   [UNK] 1   [BOS] 2   [EOS] 3
// [UNK] is not a special token, so pieces cut by the vocabulary
// cap still show up as "[UNK]" after decoding.
//
// Reference: Sennrich et al. (2016) BPE paper

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::pre_tokenizers::PreTokenizerWrapper;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, Tokenizer};

use crate::domain::error::FeedError;
use crate::domain::traits::TextTokenizer;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

const SPECIAL_TOKENS: [(&str, u32); 4] = [("[PAD]", 0), ("[UNK]", 1), ("[BOS]", 2), ("[EOS]", 3)];

const UNK_TOKEN: &str = "[UNK]";

const METASPACE: char = '▁';

// ─── HfTokenizer ──────────────────────────────────────────────────────────────
/// Adapter from a HuggingFace tokenizer to the TextTokenizer capability.
#[derive(Clone)]
pub struct HfTokenizer {
    inner:  Tokenizer,
    pad_id: u32,
}

impl HfTokenizer {
    /// Wrap a tokenizer. Built-in padding is switched off: the collator pads.
    pub fn new(mut inner: Tokenizer) -> Self {
        inner.with_padding(None);
        let pad_id = inner
            .token_to_id("[PAD]")
            .or_else(|| inner.token_to_id("<pad>"))
            .or_else(|| inner.token_to_id("<|endoftext|>"))
            .unwrap_or(0);
        Self { inner, pad_id }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path  = path.as_ref();
        let inner = Tokenizer::from_file(path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })?;
        Ok(Self::new(inner))
    }

    pub fn inner(&self) -> &Tokenizer {
        &self.inner
    }
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.vocab_size())
            .field("pad_id", &self.pad_id)
            .finish()
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str, add_special_tokens: bool) -> crate::domain::error::Result<Vec<u32>> {
        let enc = self
            .inner
            .encode(text, add_special_tokens)
            .map_err(|e| FeedError::Tokenizer(e.to_string()))?;
        Ok(enc.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> crate::domain::error::Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| FeedError::Tokenizer(e.to_string()))
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_id
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

// ─── TokenizerStore ───────────────────────────────────────────────────────────
pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Load existing tokenizer or build a new one from texts
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<HfTokenizer> {
        if self.path().exists() {
            tracing::info!("Loading existing tokenizer from '{}'", self.path().display());
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<HfTokenizer> {
        HfTokenizer::from_file(self.path())
    }

    /// Count word/punctuation tokens over `texts`, keep the most frequent
    /// `vocab_size - 4`, and write a WordLevel tokenizer JSON.
    pub fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<HfTokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // ── Step 1: Piece frequencies ────────────────────────────────────────
        // Counted with the same pre-tokenizer the saved tokenizer runs
        let pre = pre_tokenizer()?;
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for piece in pre_tokenize(&pre, text)? {
                *freq.entry(piece).or_insert(0) += 1;
            }
        }

        // Most frequent first; ties broken alphabetically so the ids are stable
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let capacity = vocab_size.saturating_sub(SPECIAL_TOKENS.len());
        if words.len() > capacity {
            tracing::warn!(
                "Vocabulary cap {} drops {} of {} pieces; they will encode as {}",
                vocab_size,
                words.len() - capacity,
                words.len(),
                UNK_TOKEN
            );
            words.truncate(capacity);
        }

        // ── Step 2: Vocab JSON ───────────────────────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (token, id) in SPECIAL_TOKENS {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        let mut next_id = SPECIAL_TOKENS.len() as u32;
        for (word, _) in &words {
            if !vocab.contains_key(word) {
                vocab.insert(word.clone(), serde_json::json!(next_id));
                next_id += 1;
            }
        }

        // ── Step 3: Tokenizer JSON in HuggingFace format ─────────────────────
        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .filter(|(content, _)| *content != UNK_TOKEN)
            .map(|(content, id)| {
                serde_json::json!({
                    "id": id, "content": content, "single_word": false,
                    "lstrip": false, "rstrip": false, "normalized": false, "special": true
                })
            })
            .collect();

        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": null,
            "pre_tokenizer": pre_tokenizer_json(),
            "post_processor": {
                "type": "TemplateProcessing",
                "single": [
                    { "SpecialToken": { "id": "[BOS]", "type_id": 0 } },
                    { "Sequence": { "id": "A", "type_id": 0 } }
                ],
                "pair": [
                    { "SpecialToken": { "id": "[BOS]", "type_id": 0 } },
                    { "Sequence": { "id": "A", "type_id": 0 } },
                    { "Sequence": { "id": "B", "type_id": 1 } }
                ],
                "special_tokens": {
                    "[BOS]": { "id": "[BOS]", "ids": [2], "tokens": ["[BOS]"] }
                }
            },
            "decoder": metaspace_json(),
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.path();
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", tok_path.display()))?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        self.load()
    }
}

fn metaspace_json() -> serde_json::Value {
    serde_json::json!({
        "type": "Metaspace",
        "replacement": METASPACE.to_string(),
        "add_prefix_space": true
    })
}

fn pre_tokenizer_json() -> serde_json::Value {
    serde_json::json!({
        "type": "Sequence",
        "pretokenizers": [
            metaspace_json(),
            { "type": "Punctuation", "behavior": "Isolated" }
        ]
    })
}

fn pre_tokenizer() -> Result<PreTokenizerWrapper> {
    serde_json::from_value(pre_tokenizer_json()).context("Invalid pre-tokenizer config")
}

/// Pieces of `text` exactly as the saved tokenizer will see them
fn pre_tokenize(pre: &PreTokenizerWrapper, text: &str) -> Result<Vec<String>> {
    let mut pretokenized = PreTokenizedString::from(text);
    pre.pre_tokenize(&mut pretokenized)
        .map_err(|e| anyhow::anyhow!("Pre-tokenisation failed: {e}"))?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_string())
        .collect())
}
