// ============================================================
// Layer 3 — Generic Padding Routine
// ============================================================
// Pads a list of unpadded samples into a rectangle, the way a
// tokenizer's pad() call does:
//
//   1. truncate each sample to `max_length` (if set)
//   2. pick the target length from the strategy
//        Longest   → longest sample in the batch
//        MaxLength → max_length (or Longest when unset)
//        DoNotPad  → samples must already agree
//   3. round the target up to `pad_to_multiple_of` (if set)
//   4. right-pad ids with the pad id, mask 1 = real / 0 = pad
//
// Example, pad id 0, Longest:
//   [5 6 7]       → [5 6 7 0]   mask [1 1 1 0]
//   [1 2 3 4]     → [1 2 3 4]   mask [1 1 1 1]

use serde::{Deserialize, Serialize};

use crate::domain::error::{FeedError, Result};
use crate::domain::sample::{PaddedInputs, TokenizedRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaddingStrategy {
    /// Pad to the longest sample in the batch
    #[default]
    Longest,
    /// Pad to a fixed `max_length`
    MaxLength,
    /// Leave samples as they are
    DoNotPad,
}

impl std::str::FromStr for PaddingStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "longest"    => Ok(PaddingStrategy::Longest),
            "max-length" => Ok(PaddingStrategy::MaxLength),
            "do-not-pad" => Ok(PaddingStrategy::DoNotPad),
            other        => Err(format!(
                "unknown padding '{other}' (expected longest, max-length or do-not-pad)"
            )),
        }
    }
}

/// Options for one pad() call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PadOptions {
    pub strategy:           PaddingStrategy,
    pub max_length:         Option<usize>,
    pub pad_to_multiple_of: Option<usize>,
}

/// Right-pad `samples` with `pad_id` according to `options`.
pub fn pad_sequences(
    samples: &[TokenizedRow],
    options: &PadOptions,
    pad_id:  u32,
) -> Result<PaddedInputs> {
    if samples.is_empty() {
        return Err(FeedError::EmptyBatch);
    }

    let lengths: Vec<usize> = samples
        .iter()
        .map(|s| options.max_length.map_or(s.len(), |cap| s.len().min(cap)))
        .collect();
    let longest = lengths.iter().copied().max().unwrap_or(0);

    let target = match options.strategy {
        PaddingStrategy::Longest   => round_up(longest, options.pad_to_multiple_of),
        PaddingStrategy::MaxLength => {
            round_up(options.max_length.unwrap_or(longest), options.pad_to_multiple_of)
        }
        PaddingStrategy::DoNotPad  => {
            let expected = lengths[0];
            if let Some(&found) = lengths.iter().find(|&&l| l != expected) {
                return Err(FeedError::RaggedBatch { expected, found });
            }
            expected
        }
    };

    let mut input_ids      = Vec::with_capacity(samples.len());
    let mut attention_mask = Vec::with_capacity(samples.len());

    for (sample, &len) in samples.iter().zip(&lengths) {
        let mut ids = Vec::with_capacity(target);
        ids.extend_from_slice(&sample.input_ids[..len]);
        ids.resize(target, pad_id);

        let mut mask = vec![1u32; len];
        mask.resize(target, 0);

        input_ids.push(ids);
        attention_mask.push(mask);
    }

    Ok(PaddedInputs { input_ids, attention_mask, lengths })
}

fn round_up(len: usize, multiple: Option<usize>) -> usize {
    match multiple {
        Some(m) if m > 0 && len % m != 0 => (len / m + 1) * m,
        _ => len,
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(ids: &[u32]) -> TokenizedRow {
        TokenizedRow::new(ids.to_vec(), "")
    }

    #[test]
    fn test_longest_right_pads() {
        let out = pad_sequences(&[row(&[5, 6, 7]), row(&[1, 2, 3, 4])], &PadOptions::default(), 0)
            .unwrap();
        assert_eq!(out.input_ids, vec![vec![5, 6, 7, 0], vec![1, 2, 3, 4]]);
        assert_eq!(out.attention_mask, vec![vec![1, 1, 1, 0], vec![1, 1, 1, 1]]);
        assert_eq!(out.lengths, vec![3, 4]);
    }

    #[test]
    fn test_pad_to_multiple_of() {
        let opts = PadOptions { pad_to_multiple_of: Some(4), ..Default::default() };
        let out  = pad_sequences(&[row(&[1; 5])], &opts, 9).unwrap();
        assert_eq!(out.seq_len(), 8);
        assert_eq!(&out.input_ids[0][5..], &[9, 9, 9]);
    }

    #[test]
    fn test_max_length_pads_and_truncates() {
        let opts = PadOptions {
            strategy:   PaddingStrategy::MaxLength,
            max_length: Some(4),
            ..Default::default()
        };
        let out = pad_sequences(&[row(&[1, 2]), row(&[1, 2, 3, 4, 5, 6])], &opts, 0).unwrap();
        assert_eq!(out.input_ids, vec![vec![1, 2, 0, 0], vec![1, 2, 3, 4]]);
        assert_eq!(out.lengths, vec![2, 4]);
    }

    #[test]
    fn test_max_length_unset_falls_back_to_longest() {
        let opts = PadOptions { strategy: PaddingStrategy::MaxLength, ..Default::default() };
        let out  = pad_sequences(&[row(&[1]), row(&[1, 2, 3])], &opts, 0).unwrap();
        assert_eq!(out.seq_len(), 3);
    }

    #[test]
    fn test_do_not_pad() {
        let opts = PadOptions { strategy: PaddingStrategy::DoNotPad, ..Default::default() };
        let ok   = pad_sequences(&[row(&[1, 2]), row(&[3, 4])], &opts, 0).unwrap();
        assert_eq!(ok.attention_mask, vec![vec![1, 1], vec![1, 1]]);

        let err = pad_sequences(&[row(&[1, 2]), row(&[3])], &opts, 0).unwrap_err();
        assert!(matches!(err, FeedError::RaggedBatch { expected: 2, found: 1 }));
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(
            pad_sequences(&[], &PadOptions::default(), 0),
            Err(FeedError::EmptyBatch)
        ));
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("max-length".parse::<PaddingStrategy>(), Ok(PaddingStrategy::MaxLength));
        assert!("pad-everything".parse::<PaddingStrategy>().is_err());
    }
}
