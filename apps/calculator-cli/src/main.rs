mod config;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use calculator_sdk::{ResilientCalculator, client_for};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Calculator Client - interactive console for the calculator service
#[derive(Parser)]
#[command(name = "calculator-cli")]
#[command(about = "Calculator Client - interactive console for the calculator service")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: ./calculator-cli.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    // The menu owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = config::load(cli.config.as_deref())?;
    tracing::info!(
        server_url = %config.server_url,
        transport = ?config.transport,
        fallback = config.fallback,
        "calculator client configured"
    );

    println!("Welcome to the Calculator Client!");
    println!("Connecting to the Calculator Server at {}...", config.server_url);

    let fallback = config.fallback;
    let calc = ResilientCalculator::new(Arc::from(client_for(config)), fallback);

    let stdin = BufReader::new(tokio::io::stdin());
    repl::run(&calc, stdin, tokio::io::stdout()).await?;
    Ok(())
}
