//! Permuted row-to-sentence serialization and label-aware batch
//! collation for training language models on tabular data.
//!
//! Layers, outermost first: `cli`, `application`, `domain`, `data`,
//! `ml`, `infra`.

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
