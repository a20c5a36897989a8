// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `render` and `collate` subcommands and their flags.
// Args are converted into the application-layer configs here, so
// Layer 2 never sees clap types.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::application::feed_use_case::FeedConfig;
use crate::data::collator::{CollatorConfig, ReturnFormat};
use crate::data::dataset::SerializerConfig;
use crate::domain::padding::PaddingStrategy;
use crate::domain::selector::{RowFilter, RowSelector};
use crate::domain::value::DEFAULT_MISSING_TOKEN;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print rows as permuted "<column> is <value>" sentences
    Render(RenderArgs),

    /// Walk a table in padded, labelled batches
    Collate(CollateArgs),
}

// ─── render ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// .json (array of objects) or .jsonl table
    #[arg(long)]
    pub table: String,

    /// Row range "a..b", or a single row "a"
    #[arg(long)]
    pub rows: Option<String>,

    /// Condition such as "city == 'Reno'" or "age != 34". Missing
    /// cells compare equal to --missing-token.
    #[arg(long)]
    pub filter: Option<String>,

    /// Seed for reproducible column orders
    #[arg(long)]
    pub seed: Option<u64>,

    /// Render every selected row this many times
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Text printed for missing values
    #[arg(long, default_value = DEFAULT_MISSING_TOKEN)]
    pub missing_token: String,
}

impl RenderArgs {
    /// With both --rows and --filter, the range rows come first and
    /// the filter matches follow.
    pub fn selector(&self) -> Result<Option<RowSelector>> {
        let rows   = self.rows.as_deref().map(parse_rows).transpose()?;
        let filter = self.filter.as_deref().map(RowFilter::parse).transpose()?.map(RowSelector::Where);

        Ok(match (rows, filter) {
            (Some(r), Some(f)) => Some(RowSelector::Many(vec![r, f])),
            (r, f)             => r.or(f),
        })
    }

    pub fn serializer_config(&self) -> SerializerConfig {
        SerializerConfig {
            seed:          self.seed,
            missing_token: self.missing_token.clone(),
            ..SerializerConfig::default()
        }
    }
}

/// "3" → Index(3), "2..5" → Range(2..5)
pub fn parse_rows(s: &str) -> Result<RowSelector> {
    let s = s.trim();
    match s.split_once("..") {
        Some((a, b)) => {
            let start: usize = a.trim().parse().map_err(|_| anyhow!("bad range start in '{s}'"))?;
            let end:   usize = b.trim().parse().map_err(|_| anyhow!("bad range end in '{s}'"))?;
            Ok(RowSelector::Range(start..end))
        }
        None => s
            .parse()
            .map(RowSelector::Index)
            .map_err(|_| anyhow!("expected a row number or a..b, got '{s}'")),
    }
}

// ─── collate ──────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct CollateArgs {
    /// .json (array of objects) or .jsonl table
    #[arg(long)]
    pub table: String,

    /// Load tokenizer.json from here, or build one from the table.
    /// Without it a byte-level tokenizer is used.
    #[arg(long)]
    pub tokenizer_dir: Option<String>,

    /// Vocabulary size when a tokenizer has to be built
    #[arg(long, default_value_t = 8000)]
    pub vocab_size: usize,

    /// Samples per batch
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Passes over the table, each with fresh column orders
    #[arg(long, default_value_t = 1)]
    pub epochs: usize,

    /// longest | max-length | do-not-pad
    #[arg(long, default_value = "longest")]
    pub padding: PaddingStrategy,

    /// Truncate to, and with max-length pad to, this many tokens
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Round the padded length up to a multiple of this
    #[arg(long)]
    pub pad_to_multiple_of: Option<usize>,

    /// Keep batches as plain id lists instead of burn tensors
    #[arg(long)]
    pub plain: bool,

    /// Prepend the tokenizer's special tokens
    #[arg(long)]
    pub special_tokens: bool,

    /// Seed for reproducible column orders
    #[arg(long)]
    pub seed: Option<u64>,

    /// Text rendered for missing values
    #[arg(long, default_value = DEFAULT_MISSING_TOKEN)]
    pub missing_token: String,

    /// Where feed_config.json and batch_stats.csv are written
    #[arg(long, default_value = "runs")]
    pub out_dir: String,
}

impl From<CollateArgs> for FeedConfig {
    fn from(a: CollateArgs) -> Self {
        FeedConfig {
            table:         a.table,
            tokenizer_dir: a.tokenizer_dir,
            vocab_size:    a.vocab_size,
            batch_size:    a.batch_size,
            epochs:        a.epochs,
            out_dir:       a.out_dir,
            serializer:    SerializerConfig {
                seed:               a.seed,
                missing_token:      a.missing_token,
                add_special_tokens: a.special_tokens,
            },
            collator:      CollatorConfig {
                padding:            a.padding,
                max_length:         a.max_length,
                pad_to_multiple_of: a.pad_to_multiple_of,
                return_format:      if a.plain { ReturnFormat::Plain } else { ReturnFormat::Tensor },
            },
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_parse_rows() {
        assert!(matches!(parse_rows("3").unwrap(), RowSelector::Index(3)));
        assert!(matches!(parse_rows(" 2..5 ").unwrap(), RowSelector::Range(r) if r == (2..5)));
        assert!(parse_rows("a..5").is_err());
        assert!(parse_rows("-1").is_err());
    }

    #[test]
    fn test_collate_args_into_config() {
        let cli = Cli::try_parse_from([
            "tabular-lm-data", "collate",
            "--table", "t.jsonl",
            "--padding", "max-length",
            "--max-length", "16",
            "--pad-to-multiple-of", "8",
            "--seed", "42",
            "--plain",
        ])
        .unwrap();

        let Commands::Collate(args) = cli.command else { panic!("expected collate") };
        let cfg: FeedConfig = args.into();

        assert_eq!(cfg.table, "t.jsonl");
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.serializer.seed, Some(42));
        assert_eq!(cfg.serializer.missing_token, "None");
        assert_eq!(cfg.collator.padding, PaddingStrategy::MaxLength);
        assert_eq!(cfg.collator.max_length, Some(16));
        assert_eq!(cfg.collator.pad_to_multiple_of, Some(8));
        assert_eq!(cfg.collator.return_format, ReturnFormat::Plain);
    }

    #[test]
    fn test_bad_padding_rejected() {
        let res = Cli::try_parse_from(["tabular-lm-data", "collate", "--table", "t", "--padding", "wide"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_render_selector_combines_rows_and_filter() {
        let cli = Cli::try_parse_from([
            "tabular-lm-data", "render",
            "--table", "t.json",
            "--rows", "0..2",
            "--filter", "city == 'Reno'",
        ])
        .unwrap();

        let Commands::Render(args) = cli.command else { panic!("expected render") };
        match args.selector().unwrap() {
            Some(RowSelector::Many(parts)) => {
                assert!(matches!(parts[0], RowSelector::Range(_)));
                assert!(matches!(parts[1], RowSelector::Where(_)));
            }
            other => panic!("unexpected selector {other:?}"),
        }
    }

    #[test]
    fn test_render_without_rows_selects_all() {
        let cli = Cli::try_parse_from(["tabular-lm-data", "render", "--table", "t.json"]).unwrap();
        let Commands::Render(args) = cli.command else { panic!("expected render") };
        assert!(args.selector().unwrap().is_none());
        assert_eq!(args.repeat, 1);
    }
}
