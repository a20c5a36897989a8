// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that define what the pipeline
// works with: cell values, row views, selectors, samples,
// batches, the padding routine, the tokenizer capability and
// the error taxonomy.
//
// Rules for this layer:
//   - NO burn tensor types
//   - NO file I/O
//   - NO concrete tokenizer implementations
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Error taxonomy shared by every library layer
pub mod error;

/// Scalar cell values and their display form
pub mod value;

/// Borrowed view of one table row
pub mod row;

/// Row selectors and filters
pub mod selector;

/// Tokenised samples and padded batches
pub mod sample;

/// The generic pad-and-stack routine
pub mod padding;

/// Core abstractions (traits) that other layers implement
pub mod traits;
