//! progressctl - run progression events and inspect unlock state offline
//!
//! Works on JSON snapshots: user stats, a task completion event, and the
//! zone/dungeon/badge catalog. Nothing is persisted unless `--write` is given.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "progressctl")]
#[command(about = "Progression & unlock engine - offline runner", long_about = None)]
#[command(version = progression_engine::VERSION)]
struct Cli {
    /// Engine config (TOML); defaults to $PROGRESSION_CONFIG or ./progression.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one completed task to a stats snapshot
    Complete {
        /// UserStats JSON
        #[arg(long)]
        stats: PathBuf,

        /// TaskCompletionEvent JSON
        #[arg(long)]
        event: PathBuf,

        /// Catalog JSON (zones, dungeons, badges)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Badge ids the user already holds (comma-separated)
        #[arg(long, value_delimiter = ',')]
        held: Vec<String>,

        /// Write the committed stats back to the --stats file
        #[arg(long)]
        write: bool,

        /// Print only the result JSON
        #[arg(long)]
        json: bool,
    },

    /// Show locked zones with blockers and progress
    Zones {
        #[arg(long)]
        stats: PathBuf,

        #[arg(long)]
        catalog: PathBuf,

        #[arg(long, value_delimiter = ',')]
        held: Vec<String>,
    },

    /// Print level thresholds and unlocked features
    Curve {
        #[arg(long, default_value_t = 25)]
        max_level: u32,
    },

    /// Show the effective configuration
    Config {
        /// Print as TOML
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Complete {
            stats,
            event,
            catalog,
            held,
            write,
            json,
        } => commands::complete(
            &config,
            &stats,
            &event,
            catalog.as_deref(),
            &held,
            write,
            json,
        ),
        Commands::Zones {
            stats,
            catalog,
            held,
        } => commands::zones(&config, &stats, &catalog, &held),
        Commands::Curve { max_level } => commands::curve(&config, max_level),
        Commands::Config { dump } => commands::config(&config, dump),
    }
}
