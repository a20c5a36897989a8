// ============================================================
// Layer 2 — RenderUseCase
// ============================================================
// Loads a table and renders the selected rows as sentences,
// without any tokenizer. Useful for eyeballing what the model
// will be trained on:
//
//   age is 34, city is Reno
//   city is Reno, age is 34
//
// Each repeat draws a new column order for every row.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::data::{
    dataset::{PermutingDataset, SerializerConfig},
    loader::JsonTableLoader,
};
use crate::domain::selector::RowSelector;
use crate::domain::traits::TableSource;

pub struct RenderUseCase {
    table:      String,
    serializer: SerializerConfig,
}

impl RenderUseCase {
    pub fn new(table: impl Into<String>, serializer: SerializerConfig) -> Self {
        Self { table: table.into(), serializer }
    }

    /// Rendered sentences for `selector` (every row when None),
    /// `repeat` passes in a row.
    pub fn execute(&self, selector: Option<&RowSelector>, repeat: usize) -> Result<Vec<String>> {
        let store = JsonTableLoader::new(&self.table)
            .load_table()
            .with_context(|| format!("Cannot load table '{}'", self.table))?;

        let indices = match selector {
            Some(s) => store.select_with(s, &self.serializer.missing_token)?,
            None    => (0..store.num_rows()).collect(),
        };
        tracing::info!("Rendering {} rows x {} passes", indices.len(), repeat);

        let dataset = PermutingDataset::new(Arc::new(store), self.serializer.clone());

        let mut sentences = Vec::with_capacity(indices.len() * repeat);
        for _ in 0..repeat {
            for &i in &indices {
                sentences.push(dataset.render(i)?);
            }
        }
        Ok(sentences)
    }
}
