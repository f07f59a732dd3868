//! `sqlite-dynamic` serves the database actions over stdin/stdout.
//!
//! ```bash
//! # Default root ./databases
//! sqlite-dynamic
//!
//! # Custom root and verbose logs (logs go to stderr)
//! sqlite-dynamic --root /var/lib/sqlite-dynamic -v
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqlite_dynamic::server;
use sqlite_dynamic::service::{Service, SqliteDynamicService};
use sqlite_dynamic::StoreConfig;

#[derive(Parser, Debug)]
#[command(
    name = "sqlite-dynamic",
    version,
    about = "Create, populate and query SQLite databases by name over line-delimited JSON"
)]
struct Args {
    /// Directory holding the database files
    #[arg(short = 'r', long, value_name = "DIR", env = "SQLITE_DYNAMIC_ROOT")]
    root: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "SQLITE_DYNAMIC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    init_logging(&config, args.verbose);

    let service = SqliteDynamicService::new(&config)?;
    service.start().await?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    tokio::select! {
        result = server::serve(&service, stdin, stdout) => {
            result.context("transport failed")?;
            info!("input closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    service.stop().await
}

fn init_logging(config: &StoreConfig, verbose: bool) {
    let level = if verbose { "debug" } else { &config.log_level };

    let filter = EnvFilter::try_new(format!("sqlite_dynamic={level}"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(args: &Args) -> Result<StoreConfig> {
    let mut config = match &args.config {
        Some(path) => StoreConfig::from_file(path).context("Failed to load config file")?,
        None => StoreConfig::default(),
    };

    if let Some(root) = &args.root {
        config.root_dir = root.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    Ok(config)
}
