// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concrete implementations that touch the outside world:
//
//   tokenizer_store.rs — HuggingFace tokenizer adapter plus
//                        loading/building of tokenizer.json
//                        from the rendered row sentences
//
//   byte_tokenizer.rs  — vocabulary-free byte-level tokenizer,
//                        exact round trip, no files needed
//
//   metrics.rs         — per-batch statistics CSV
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// HuggingFace tokenizer adapter and tokenizer.json persistence
pub mod tokenizer_store;

/// Byte-level tokenizer
pub mod byte_tokenizer;

/// Batch statistics CSV logger
pub mod metrics;
