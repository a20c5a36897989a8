// ============================================================
// Layer 4 — Label-Aware Collator
// ============================================================
// Merges unpadded samples into one padded batch and derives the
// causal-LM labels from it.
//
//   Input:  N TokenizedRows of different lengths
//   Step 1: tokenizer.pad()  → input_ids + attention_mask [N, S]
//   Step 2: labels = deep copy of input_ids               [N, S]
//
// The labels are a separate buffer, never a view of input_ids,
// so a later in-place edit of either (masking pad positions for
// the loss, say) cannot leak into the other.
//
// Example, pad id 0, lengths 5 and 8, Longest:
//   input_ids  [a a a a a 0 0 0]   labels [a a a a a 0 0 0]
//              [b b b b b b b b]          [b b b b b b b b]
//   mask       [1 1 1 1 1 0 0 0]
//              [1 1 1 1 1 1 1 1]
//
// Reference: Burn Book §4 (Batcher)

use std::sync::Arc;

use burn::prelude::Backend;
use serde::{Deserialize, Serialize};

use crate::domain::error::Result;
use crate::domain::padding::{PadOptions, PaddingStrategy};
use crate::domain::sample::{PaddedBatch, TokenizedRow};
use crate::domain::traits::TextTokenizer;
use crate::ml::batch::LmBatch;

/// Shape of the collator's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnFormat {
    /// burn Int tensors
    #[default]
    Tensor,
    /// Row-major Vec<Vec<u32>>
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollatorConfig {
    pub padding:            PaddingStrategy,
    pub max_length:         Option<usize>,
    pub pad_to_multiple_of: Option<usize>,
    pub return_format:      ReturnFormat,
}

impl CollatorConfig {
    pub fn with_padding(mut self, padding: PaddingStrategy) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_pad_to_multiple_of(mut self, multiple: usize) -> Self {
        self.pad_to_multiple_of = Some(multiple);
        self
    }

    pub fn with_return_format(mut self, format: ReturnFormat) -> Self {
        self.return_format = format;
        self
    }

    pub fn pad_options(&self) -> PadOptions {
        PadOptions {
            strategy:           self.padding,
            max_length:         self.max_length,
            pad_to_multiple_of: self.pad_to_multiple_of,
        }
    }
}

/// A collated batch in the configured return format
#[derive(Debug, Clone)]
pub enum Collated<B: Backend> {
    Tensor(LmBatch<B>),
    Plain(PaddedBatch),
}

#[derive(Clone)]
pub struct LabelCollator {
    tokenizer: Arc<dyn TextTokenizer>,
    config:    CollatorConfig,
}

impl LabelCollator {
    pub fn new(tokenizer: Arc<dyn TextTokenizer>, config: CollatorConfig) -> Self {
        Self { tokenizer, config }
    }

    pub fn config(&self) -> &CollatorConfig {
        &self.config
    }

    /// Pad `samples` and attach labels. Fails with `EmptyBatch` on an empty slice.
    pub fn collate(&self, samples: &[TokenizedRow]) -> Result<PaddedBatch> {
        let padded = self.tokenizer.pad(samples, &self.config.pad_options())?;
        let labels = padded.input_ids.clone();

        tracing::debug!(
            "Collated batch: {} x {}",
            padded.batch_size(),
            padded.seq_len()
        );

        Ok(PaddedBatch {
            input_ids:      padded.input_ids,
            attention_mask: padded.attention_mask,
            labels,
            lengths:        padded.lengths,
        })
    }

    /// Collate straight into burn tensors on `device`.
    pub fn collate_tensors<B: Backend>(
        &self,
        samples: &[TokenizedRow],
        device:  &B::Device,
    ) -> Result<LmBatch<B>> {
        let batch = self.collate(samples)?;
        LmBatch::from_padded(&batch, device)
    }

    /// Collate into whichever format the config asks for.
    pub fn collate_as<B: Backend>(
        &self,
        samples: &[TokenizedRow],
        device:  &B::Device,
    ) -> Result<Collated<B>> {
        match self.config.return_format {
            ReturnFormat::Tensor => self.collate_tensors(samples, device).map(Collated::Tensor),
            ReturnFormat::Plain  => self.collate(samples).map(Collated::Plain),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::FeedError;
    use crate::infra::byte_tokenizer::ByteTokenizer;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn collator(config: CollatorConfig) -> LabelCollator {
        LabelCollator::new(Arc::new(ByteTokenizer::new()), config)
    }

    fn sample(len: usize, fill: u32) -> TokenizedRow {
        TokenizedRow::new(vec![fill; len], "")
    }

    fn to_rows(t: burn::tensor::Tensor<TestBackend, 2, burn::tensor::Int>) -> Vec<Vec<i32>> {
        let [rows, cols] = t.dims();
        let flat = t.into_data().convert::<i32>().to_vec::<i32>().unwrap();
        (0..rows).map(|r| flat[r * cols..(r + 1) * cols].to_vec()).collect()
    }

    #[test]
    fn test_lengths_five_and_eight() {
        let batch = collator(CollatorConfig::default())
            .collate(&[sample(5, 7), sample(8, 9)])
            .unwrap();

        assert_eq!(batch.shape(), (2, 8));
        assert_eq!(batch.input_ids[0], vec![7, 7, 7, 7, 7, 0, 0, 0]);
        assert_eq!(batch.labels[0][5..], [0, 0, 0]);
        assert_eq!(batch.attention_mask[0], vec![1, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(batch.attention_mask[1], vec![1; 8]);
    }

    #[test]
    fn test_empty_batch() {
        let err = collator(CollatorConfig::default()).collate(&[]).unwrap_err();
        assert!(matches!(err, FeedError::EmptyBatch));
    }

    #[test]
    fn test_labels_are_independent_copy() {
        let mut batch = collator(CollatorConfig::default())
            .collate(&[sample(3, 4), sample(1, 5)])
            .unwrap();
        assert_eq!(batch.labels, batch.input_ids);

        batch.input_ids[1][0] = 999;
        batch.input_ids[0].iter_mut().for_each(|x| *x = 0);
        assert_eq!(batch.labels, vec![vec![4, 4, 4], vec![5, 0, 0]]);
    }

    #[test]
    fn test_config_is_honoured() {
        let config = CollatorConfig::default()
            .with_padding(PaddingStrategy::MaxLength)
            .with_max_length(6)
            .with_pad_to_multiple_of(4);
        let batch = collator(config).collate(&[sample(2, 1), sample(10, 2)]).unwrap();

        // truncated to 6, rounded up to 8
        assert_eq!(batch.shape(), (2, 8));
        assert_eq!(batch.lengths, vec![2, 6]);
        assert_eq!(batch.labels, batch.input_ids);
    }

    #[test]
    fn test_tensor_format_matches_plain() {
        let c       = collator(CollatorConfig::default());
        let samples = [sample(5, 7), sample(8, 9)];
        let device  = Default::default();

        let plain  = c.collate(&samples).unwrap();
        let tensor = c.collate_tensors::<TestBackend>(&samples, &device).unwrap();

        assert_eq!(tensor.input_ids.dims(), [2, 8]);
        assert_eq!(tensor.labels.dims(), [2, 8]);
        assert_eq!(tensor.attention_mask.dims(), [2, 8]);

        let widen = |m: &Vec<Vec<u32>>| -> Vec<Vec<i32>> {
            m.iter().map(|r| r.iter().map(|&x| x as i32).collect()).collect()
        };
        assert_eq!(to_rows(tensor.input_ids), widen(&plain.input_ids));
        assert_eq!(to_rows(tensor.labels), widen(&plain.labels));
        assert_eq!(to_rows(tensor.attention_mask), widen(&plain.attention_mask));
    }

    #[test]
    fn test_tensor_labels_survive_input_edit() {
        let c      = collator(CollatorConfig::default());
        let device = Default::default();
        let batch  = c
            .collate_tensors::<TestBackend>(&[sample(2, 3), sample(4, 3)], &device)
            .unwrap();

        let pad_positions = batch.attention_mask.clone().equal_elem(0);
        let masked        = batch.input_ids.clone().mask_fill(pad_positions, -100);

        assert_eq!(to_rows(masked)[0], vec![3, 3, -100, -100]);
        assert_eq!(to_rows(batch.labels)[0], vec![3, 3, 0, 0]);
    }

    #[test]
    fn test_collate_as_dispatches_on_format() {
        let device  = Default::default();
        let samples = [sample(1, 1)];

        let plain = collator(CollatorConfig::default().with_return_format(ReturnFormat::Plain));
        assert!(matches!(
            plain.collate_as::<TestBackend>(&samples, &device),
            Ok(Collated::Plain(_))
        ));

        let tensor = collator(CollatorConfig::default());
        assert!(matches!(
            tensor.collate_as::<TestBackend>(&samples, &device),
            Ok(Collated::Tensor(_))
        ));
    }
}
