//! CLI for Vantage
//!
//! Commands:
//! - process: Compute per-command GPU performance from a trace
//! - query: Aggregate a stored snapshot over a command range

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Vantage - per-command GPU performance", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute GPU performance for every command of a trace
    Process(commands::process::ProcessArgs),

    /// Aggregate a stored snapshot over a range of commands
    Query(commands::query::QueryArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Process(args) => {
            init_tracing(args.verbose);
            commands::process::run(args)
        }
        Commands::Query(args) => {
            init_tracing(args.verbose);
            commands::query::run(args)
        }
    };

    if let Err(e) = result {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
