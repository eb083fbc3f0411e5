//! CLI command definitions and dispatch.

pub mod config;
pub mod handlers;
pub mod hook_types;
pub mod trigger;

use clap::{Parser, Subcommand};

use rimuru_builtin_hooks::register_builtin_handlers;
use rimuru_core::config::AppConfig;
use rimuru_hooks::HookManager;

use crate::output::OutputFormat;

/// Rimuru hooks: fire lifecycle hooks and inspect the hook engine
#[derive(Debug, Parser)]
#[command(name = "rimuru-hooks", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fire a hook and show what the handlers did
    Trigger(trigger::TriggerArgs),
    /// List hook types
    HookTypes,
    /// List registered handlers
    Handlers(handlers::HandlersArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        match &self.command {
            Commands::Config(args) => config::execute(args, &self.config, &config, self.format),
            Commands::Trigger(args) => {
                let manager = build_manager(&config).await?;
                trigger::execute(args, &manager, self.format).await
            }
            Commands::HookTypes => {
                let manager = build_manager(&config).await?;
                hook_types::execute(&manager, self.format).await
            }
            Commands::Handlers(args) => {
                let manager = build_manager(&config).await?;
                handlers::execute(args, &manager, self.format).await
            }
        }
    }
}

/// Helper: build a hook manager with the configured built-in handlers
pub async fn build_manager(config: &AppConfig) -> anyhow::Result<HookManager> {
    let manager = HookManager::from_config(&config.hooks)?;
    register_builtin_handlers(&manager, &config.builtin).await?;
    Ok(manager)
}
