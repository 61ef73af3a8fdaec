//! Gantry - buffered bulk loading from stdin into a warehouse
//!
//! # Usage
//!
//! ```bash
//! # Run the loader (default), reading JSON rows from stdin
//! gantry
//! gantry --config gantry.toml
//! tail -F events.jsonl | gantry run
//!
//! # Validate a config file without connecting anywhere
//! gantry check --config gantry.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Gantry - buffered bulk loading from stdin into a warehouse
#[derive(Parser, Debug)]
#[command(name = "gantry")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    // Global args that apply to run when no subcommand given
    /// Path to configuration file
    #[arg(short, long, default_value = "gantry.toml", global = true)]
    config: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the loader, reading rows from stdin
    Run(cmd::run::RunArgs),

    /// Validate a config file without connecting anywhere
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Explicit subcommand
        Some(Command::Run(args)) => {
            init_logging(&cli.log_level)?;
            cmd::run::run(args).await
        }
        Some(Command::Check(args)) => {
            init_logging(&cli.log_level)?;
            cmd::check::run(args)
        }
        // No subcommand = run the loader (default behavior)
        None => {
            init_logging(&cli.log_level)?;
            let args = cmd::run::RunArgs { config: cli.config };
            cmd::run::run(args).await
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}
