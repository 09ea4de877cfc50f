//! Docquery CLI
//!
//! Main entry point for the docquery command-line tool.
//! Asks natural-language questions against an indexed document collection
//! and prints answers grounded in retrieved passages, with cited sources.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, FiltersCommand, HealthCommand};
use docquery_core::{config::AppConfig, logging};
use std::path::PathBuf;

/// Docquery CLI - grounded answers from an indexed document collection
#[derive(Parser, Debug)]
#[command(name = "docquery")]
#[command(about = "Ask questions against an indexed document collection", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQUERY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question against the document index
    Ask(AskCommand),

    /// List the filter values available in the index
    Filters(FiltersCommand),

    /// Probe connectivity to both backends
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from file and environment, then apply CLI overrides
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Search endpoint: {}", config.search_endpoint);
    tracing::debug!("Generation deployment: {}", config.generation_deployment);

    // Backend settings must be complete before any request goes out
    config.validate()?;

    match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await?,
        Commands::Filters(cmd) => cmd.execute(&config).await?,
        Commands::Health(cmd) => cmd.execute(&config).await?,
    }

    Ok(())
}
