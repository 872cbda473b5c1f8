//! amrgen - inspect realization features, build corpus tables and score
//! candidate sentences with a neural language model.

use std::path::PathBuf;

use amrgen_features::Aspect;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;

/// Surface realization tooling for AMR graphs.
#[derive(Parser, Debug)]
#[command(
    name = "amrgen",
    author,
    version,
    about = "AMR realization features, corpus tables and LM scoring",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score candidate sentences (one per line) and print them best first.
    Score {
        /// File with one sentence per line (defaults to stdin).
        input: Option<PathBuf>,

        /// Scorer configuration file (TOML).
        #[arg(short, long, env = "AMRGEN_SCORER_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Build lookup tables from a labeled corpus and save them as JSON.
    Tables {
        /// Corpus file (JSON array of graphs).
        #[arg(long)]
        corpus: PathBuf,

        /// Output file.
        #[arg(short, long, default_value = "tables.json")]
        output: PathBuf,
    },

    /// Print the feature contexts of one aspect for every eligible vertex.
    Features {
        /// Corpus file (JSON array of graphs).
        #[arg(long)]
        corpus: PathBuf,

        /// Aspect to dump: merge, name-order, number or article.
        #[arg(short, long, default_value = "article")]
        aspect: Aspect,

        /// Attach alignment-derived gold labels instead of predictions.
        #[arg(long)]
        training: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .init();

    let _ = dotenvy::dotenv();

    match cli.command {
        Commands::Score { input, config } => {
            commands::score::execute(input.as_deref(), config.as_deref())?;
        }
        Commands::Tables { corpus, output } => {
            commands::tables::execute(&corpus, &output)?;
        }
        Commands::Features {
            corpus,
            aspect,
            training,
        } => {
            commands::features::execute(&corpus, aspect, training)?;
        }
    }

    Ok(())
}
