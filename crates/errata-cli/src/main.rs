//! Errata CLI - explain captured runtime failures from the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Errata - plain-language explanations for runtime errors
#[derive(Parser)]
#[command(name = "errata")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain a serialized runtime context
    Explain {
        /// Runtime context (JSON file)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Skip AI providers even if configured
        #[arg(long)]
        no_ai: bool,
    },

    /// Show strategies and the active configuration
    Info,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match cli.command {
        Commands::Explain { file, json, no_ai } => tokio::runtime::Runtime::new()
            .map_err(|e| miette::miette!("Failed to start async runtime: {}", e))?
            .block_on(commands::explain::run(&file, json, no_ai)),
        Commands::Info => commands::info::run(),
    }
}
