// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the upstream table file and a padded,
// labelled training batch:
//
//   table.json / table.jsonl
//       │
//       ▼
//   JsonTableLoader   → reads records, fixes the schema
//       │
//       ▼
//   TabularStore      → immutable columns, resolves selectors
//       │
//       ▼
//   RowSerializer     → "<name> is <value>" clauses, random order
//       │
//       ▼
//   PermutingDataset  → selector → tokenised samples (unpadded)
//       │
//       ▼
//   LabelCollator     → pads the batch, copies input_ids to labels
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads .json / .jsonl tables
pub mod loader;

/// Column-oriented tabular store
pub mod table;

/// Renders a row as a permuted sentence
pub mod serializer;

/// Permuting dataset accessor (implements Burn's Dataset trait)
pub mod dataset;

/// Pads batches and derives labels
pub mod collator;
