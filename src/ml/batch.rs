// ============================================================
// Layer 5 — Tensor Batch
// ============================================================
// The tensor flavour of a collated batch, ready for a burn model.
//
//   PaddedBatch (Vec<Vec<u32>>)  ──►  LmBatch<B> (Tensor<B, 2, Int>)
//
// Each field is flattened row-major and reshaped to
// [batch_size, seq_len]:
//   [s1_t1, s1_t2, ..., s1_tS, s2_t1, ..., sN_tS] → [N, S]
//
// labels get their own host buffer and their own tensor; they
// are never derived from the input_ids tensor.
//
// burn Int elements are i32 here, so ids above i32::MAX are
// rejected with TokenIdOverflow instead of wrapping.
//
// B is the burn Backend (NdArray, Wgpu, ...) so the same code
// works on any device.
//
// Reference: Burn Book §4 (Batcher)

use burn::prelude::*;

use crate::domain::error::{FeedError, Result};
use crate::domain::sample::PaddedBatch;

#[derive(Debug, Clone)]
pub struct LmBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Training targets — shape: [batch_size, seq_len]
    pub labels: Tensor<B, 2, Int>,
}

impl<B: Backend> LmBatch<B> {
    /// Build tensors on `device` from a plain batch.
    pub fn from_padded(batch: &PaddedBatch, device: &B::Device) -> Result<Self> {
        let (batch_size, seq_len) = batch.shape();

        Ok(Self {
            input_ids:      to_tensor(&batch.input_ids, batch_size, seq_len, device)?,
            attention_mask: to_tensor(&batch.attention_mask, batch_size, seq_len, device)?,
            labels:         to_tensor(&batch.labels, batch_size, seq_len, device)?,
        })
    }

    /// [batch_size, seq_len]
    pub fn dims(&self) -> [usize; 2] {
        self.input_ids.dims()
    }
}

fn to_tensor<B: Backend>(
    rows:       &[Vec<u32>],
    batch_size: usize,
    seq_len:    usize,
    device:     &B::Device,
) -> Result<Tensor<B, 2, Int>> {
    let flat = rows
        .iter()
        .flatten()
        .map(|&x| i32::try_from(x).map_err(|_| FeedError::TokenIdOverflow(x)))
        .collect::<Result<Vec<i32>>>()?;

    Ok(Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device).reshape([batch_size, seq_len]))
}
