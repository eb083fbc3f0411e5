//! Rimuru hooks CLI: fire hooks and inspect the hook engine.
//!
//! Loads configuration, initialises logging, builds a `HookManager` with the
//! built-in handlers, and runs one command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use rimuru_core::config::AppConfig;
use rimuru_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(config).await {
        tracing::error!("Command failed: {:#}", e);
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(config_path: &str) -> Result<AppConfig, AppError> {
    let config = AppConfig::load(config_path)?;
    tracing::debug!("Loaded config from '{}'", config_path);
    Ok(config)
}

/// Initialize tracing/logging. Log lines go to stderr so command output
/// stays machine-readable.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
