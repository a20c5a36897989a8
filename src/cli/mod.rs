// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `render`  — prints rows as permuted sentences
//   2. `collate` — walks a table in padded, labelled batches
//                  and writes batch statistics
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CollateArgs, Commands, RenderArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tabular-lm-data",
    version = "0.1.0",
    about = "Render table rows as permuted sentences and collate them into training batches."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; nothing is computed here.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Render(args)  => run_render(args),
            Commands::Collate(args) => run_collate(args),
        }
    }
}

fn run_render(args: RenderArgs) -> Result<()> {
    use crate::application::render_use_case::RenderUseCase;

    let selector  = args.selector()?;
    let repeat    = args.repeat;
    let use_case  = RenderUseCase::new(args.table.clone(), args.serializer_config());
    let sentences = use_case.execute(selector.as_ref(), repeat)?;

    for s in sentences {
        println!("{s}");
    }
    Ok(())
}

fn run_collate(args: CollateArgs) -> Result<()> {
    use crate::application::feed_use_case::FeedUseCase;

    tracing::info!("Collating table: {}", args.table);

    let summary = FeedUseCase::new(args.into()).execute()?;

    println!(
        "Collated {} samples into {} batches. Stats: {}",
        summary.samples,
        summary.batches,
        summary.stats_path.display()
    );
    Ok(())
}
