// ============================================================
// Layer 6 — Byte Tokenizer
// ============================================================
// A vocabulary-free tokenizer: every UTF-8 byte becomes one id.
//
//   id 0        → [PAD]
//   id 1        → [BOS]  (only with add_special_tokens)
//   id 2        → [EOS]  (reserved, never emitted by encode)
//   id 3..=258  → byte value + 3
//
// Decoding is exact, so it is the default tokenizer for the CLI
// when no tokenizer.json is available, and the round-trip
// reference in tests.
//
// Special-token policy: an empty sentence encodes to [] without
// special tokens and to [BOS] with them.

use crate::domain::error::{FeedError, Result};
use crate::domain::traits::TextTokenizer;

pub const PAD_ID: u32 = 0;
pub const BOS_ID: u32 = 1;
pub const EOS_ID: u32 = 2;

const BYTE_OFFSET: u32 = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTokenizer;

impl ByteTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextTokenizer for ByteTokenizer {
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(text.len() + 1);
        if add_special_tokens {
            ids.push(BOS_ID);
        }
        ids.extend(text.bytes().map(|b| b as u32 + BYTE_OFFSET));
        Ok(ids)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let mut bytes = Vec::with_capacity(ids.len());
        for &id in ids {
            match id {
                PAD_ID | BOS_ID | EOS_ID => continue,
                id if id < BYTE_OFFSET + 256 => bytes.push((id - BYTE_OFFSET) as u8),
                id => {
                    return Err(FeedError::Tokenizer(format!(
                        "id {id} outside byte vocabulary of {}",
                        self.vocab_size()
                    )))
                }
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn pad_token_id(&self) -> u32 {
        PAD_ID
    }

    fn vocab_size(&self) -> usize {
        (BYTE_OFFSET + 256) as usize
    }
}
