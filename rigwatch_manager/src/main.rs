use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rigwatch_core::{RigwatchConfig, StatusEngine};
use rigwatch_manager::commands::status::{execute_status, StatusLine};
use rigwatch_manager::feed;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rigwatch")]
#[command(about = "RIGWATCH - status lines for a CGM/pump watch face")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to the standard search paths)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Nightscout site URL (overrides [feed] url)
    #[arg(short = 'u', long = "url", global = true, conflicts_with = "fixtures")]
    url: Option<String>,

    /// Read feed documents from a directory of JSON files instead of a site
    #[arg(short = 'f', long = "fixtures", global = true)]
    fixtures: Option<PathBuf>,

    /// Show raw glucose values in mmol/L
    #[arg(long = "mmol", global = true)]
    mmol: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current basal rate, with temp basal difference and age when one is running
    Basal,

    /// Uploader battery level, or "-" when the last report is stale
    Battery,

    /// Raw sensor values with the newest sample's noise level
    Raw,

    /// Age of the newest sensor sample, empty while data is fresh
    Staleness,

    /// Every status line, one per row
    All,
}

impl From<Commands> for StatusLine {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Basal => StatusLine::Basal,
            Commands::Battery => StatusLine::Battery,
            Commands::Raw => StatusLine::Raw,
            Commands::Staleness => StatusLine::Staleness,
            Commands::All => StatusLine::All,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "rigwatch_manager=debug,rigwatch_core=debug"
    } else {
        "rigwatch_manager=info,rigwatch_core=info"
    };

    // Status lines go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config =
        RigwatchConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = cli.url {
        config.feed.url = Some(url);
    }
    if cli.mmol {
        config.display.mmol = true;
    }

    let feed = feed::build_feed(&config.feed, cli.fixtures.as_deref())?;
    let engine = StatusEngine::new(feed).with_constants(config.constants.clone());

    let lines = execute_status(&engine, &config.display, cli.command.into())
        .await
        .context("Failed to resolve status")?;

    for line in lines {
        println!("{}", line);
    }

    Ok(())
}
