// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one CLI command each.
//
// Rules for this layer:
//   - No padding or serialisation logic here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - Only workflow coordination, errors carried as anyhow
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Render rows as sentences
pub mod render_use_case;

// Walk a table in collated batches
pub mod feed_use_case;
