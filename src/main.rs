//! # impact-views CLI (`tiviews`)
//!
//! Evaluates the `queues` design document's views over documents on disk.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tiviews views` | List every view with a short description |
//! | `tiviews map <view>` | Print the rows of one view, in index order |
//! | `tiviews run` | Run every view and print row counts and fingerprints |
//! | `tiviews stats` | Count input documents by type |
//! | `tiviews design` | Print the design document describing the views |
//!
//! ## Examples
//!
//! ```bash
//! # Rows for one DOI namespace
//! tiviews map by_alias --input ./docs \
//!     --start-key '["doi"]' --end-key '["doi", "￰"]'
//!
//! # Newest collections first
//! tiviews map latest-collections --input ./docs --descending --limit 20
//!
//! # Documents piped in as JSON lines
//! cat docs.jsonl | tiviews map needs_aliases --input -
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use impact_views::query::{parse_key, QueryOptions};
use impact_views::{catalog, config, observability, query, stats, summary};

/// impact-views CLI: evaluate altmetrics secondary-index views over
/// stored documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tiviews.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "tiviews",
    about = "Evaluate altmetrics secondary-index views over stored documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/tiviews.toml`. A missing file means defaults.
    #[arg(long, global = true, default_value = "./config/tiviews.toml")]
    config: PathBuf,

    /// Document source: a file, a directory, or `-` for JSON lines on stdin.
    ///
    /// Overrides `[input].path` from the config file.
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List available views.
    Views,

    /// Print the rows one view emits, in index order.
    ///
    /// Each row is printed as a JSON object with `id`, `key` and `value`.
    Map {
        /// View name, with or without the `queues/` prefix.
        view: String,

        /// Lowest key to include, as JSON (e.g. `'["doi"]'`).
        #[arg(long)]
        start_key: Option<String>,

        /// Highest key to include, as JSON.
        #[arg(long)]
        end_key: Option<String>,

        /// Return rows in reverse order. The start key is then the upper bound.
        #[arg(long)]
        descending: bool,

        /// Maximum number of rows to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run every view and summarise the rows.
    ///
    /// Prints row counts and a fingerprint of each index, so two document
    /// sets (or two builds) can be compared.
    Run,

    /// Show document counts by type.
    Stats,

    /// Print the design document describing every view.
    Design,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    observability::init_logging(&cfg.logging)?;

    let input = cli.input.as_deref();

    match cli.command {
        Commands::Views => {
            catalog::list_views(&cfg)?;
        }
        Commands::Map {
            view,
            start_key,
            end_key,
            descending,
            limit,
        } => {
            let options = QueryOptions {
                start_key: start_key
                    .map(|k| parse_key("--start-key", &k))
                    .transpose()?,
                end_key: end_key.map(|k| parse_key("--end-key", &k)).transpose()?,
                descending,
                limit,
            };
            query::run_map(&cfg, &view, input, &options)?;
        }
        Commands::Run => {
            summary::run_summary(&cfg, input)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg, input)?;
        }
        Commands::Design => {
            catalog::run_design(&cfg)?;
        }
    }

    Ok(())
}
