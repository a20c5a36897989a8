// ============================================================
// Layer 5 — ML Layer (Burn)
// ============================================================
// The only place collated batches become burn tensors.
//
//   batch.rs — LmBatch<B>: input_ids, attention_mask and labels
//              as [batch_size, seq_len] Int tensors on any backend
//
// Reference: Burn Book §3 (Building Blocks)

/// Tensor form of a collated batch
pub mod batch;
