//! offcache - drive the offline cache lifecycle from the command line.
//!
//! Seeds the current cache generation into an on-disk store, removes stale
//! generations, and performs cache-first fetches against it.

mod commands;
mod config;
mod format;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CacheCli, Command};
use config::CliConfig;

/// Initialize the tracing subscriber for logging.
///
/// Returns the file writer guard when a log file is configured; logs are
/// flushed when it is dropped.
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "offcache.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // A config error falls back to the log file named by the environment
    let loaded = CliConfig::load();
    let log_file = match &loaded {
        Ok(config) => config.log_file.clone(),
        Err(_) => CliConfig::log_file_from_env(),
    };
    let _guard = init_tracing(log_file.as_deref());
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e);
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(Some(command)) => command,
        Ok(None) => {
            println!("{}", commands::USAGE);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, commands::USAGE);
            std::process::exit(2);
        }
    };

    info!(?command, "offcache starting");
    let cli = CacheCli::from_config(&config)?;
    commands::run(command, &cli).await
}
