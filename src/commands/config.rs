//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use rimuru_core::config::AppConfig;
use rimuru_hooks::HookManager;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => println!("{:#?}", config),
        },
        ConfigCommand::Validate => {
            // Loading already ran the range checks; building the manager
            // also checks override keys.
            HookManager::from_config(&config.hooks)?;

            output::print_success(&format!("Configuration '{}' is valid", config_path));
            let hooks = &config.hooks;
            output::print_kv("Timeout", &format!("{}ms", hooks.default_timeout_ms));
            output::print_kv("Max handlers", &hooks.max_handlers.to_string());
            output::print_kv(
                "Mode",
                if hooks.parallel { "parallel" } else { "sequential" },
            );
            output::print_kv("History", &hooks.history_capacity.to_string());

            let mut overrides: Vec<&String> = hooks.overrides.keys().collect();
            overrides.sort();
            output::print_kv(
                "Overrides",
                &if overrides.is_empty() {
                    "-".to_string()
                } else {
                    overrides
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                },
            );

            let builtin = &config.builtin;
            output::print_kv(
                "Cost alert",
                &if builtin.cost_alert.enabled {
                    format!("on (> ${:.2})", builtin.cost_alert.threshold_usd)
                } else {
                    "off".to_string()
                },
            );
            output::print_kv(
                "Session log",
                if builtin.session_log.enabled { "on" } else { "off" },
            );
            output::print_kv(
                "Metrics export",
                if builtin.metrics_export.enabled { "on" } else { "off" },
            );
        }
    }

    Ok(())
}
