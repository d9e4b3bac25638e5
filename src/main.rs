mod commands;
mod render;
mod source;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eventdir_core::{EventDirConfig, EventKind};
use tracing_subscriber::EnvFilter;

use crate::source::Source;

#[derive(Parser)]
#[command(name = "eventdir")]
#[command(about = "Browse the community events directory as a timeline or calendar")]
struct Cli {
    /// Read records from a JSON snapshot instead of the configured store
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upcoming records grouped by day
    Timeline {
        /// Include records that have already ended
        #[arg(short, long)]
        all: bool,

        /// Only show one kind (event, hackathon, scholarship)
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<EventKind>,
    },
    /// Month grid (defaults to the current month)
    Month {
        /// Month number, 1-12
        #[arg(short, long)]
        month: Option<u32>,

        #[arg(short, long)]
        year: Option<i32>,

        /// Move forward this many months
        #[arg(long, conflicts_with = "prev")]
        next: Option<u32>,

        /// Move back this many months
        #[arg(long)]
        prev: Option<u32>,
    },
    /// Week grid for the week containing a date
    Week {
        /// Any date in the week (e.g. "2025-12-03", "next friday")
        #[arg(long)]
        on: Option<String>,
    },
    /// Write a record as an .ics file
    Export {
        id: String,

        /// Output path (defaults to <id>.ics)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reprint the timeline whenever the store changes
    Watch,
    /// Show the config path and effective values
    Config,
}

fn parse_kind(value: &str) -> Result<EventKind, String> {
    EventKind::from_label(value)
        .ok_or_else(|| format!("unknown kind '{value}' (expected event, hackathon or scholarship)"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eventdir=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let Cli { snapshot, command } = Cli::parse();
    let config = EventDirConfig::load()?;
    let options = config.grid_options();
    let open = || Source::open(&config, snapshot.as_deref());

    match command {
        Commands::Timeline { all, kind } => commands::timeline::run(&open()?, all, kind).await,
        Commands::Month {
            month,
            year,
            next,
            prev,
        } => commands::month::run(&open()?, &options, month, year, next, prev).await,
        Commands::Week { on } => commands::week::run(&open()?, &options, on.as_deref()).await,
        Commands::Export { id, output } => commands::export::run(&open()?, &id, output).await,
        Commands::Watch => commands::watch::run(&open()?).await,
        Commands::Config => commands::config::run(&config),
    }
}
