//! `handlers`: list registered handlers.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use rimuru_hooks::HookManager;

use crate::output::{self, OutputFormat};

/// Arguments for the handlers command
#[derive(Debug, Args)]
pub struct HandlersArgs {
    /// Only show handlers of this hook
    #[arg(long)]
    pub hook: Option<String>,
}

/// Handler display row
#[derive(Debug, Serialize, Tabled)]
struct HandlerRow {
    /// ID
    id: String,
    /// Hook
    hook: String,
    /// Priority
    priority: i32,
    /// Enabled
    enabled: String,
    /// Plugin
    plugin: String,
    /// Description
    description: String,
}

/// Execute the handlers command
pub async fn execute(
    args: &HandlersArgs,
    manager: &HookManager,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let handlers = manager.list_handlers(args.hook.as_deref()).await;

    let rows: Vec<HandlerRow> = handlers
        .into_iter()
        .map(|h| HandlerRow {
            id: h.id,
            hook: h.hook_type.to_string(),
            priority: h.priority,
            enabled: if h.enabled { "✓" } else { "✗" }.to_string(),
            plugin: output::or_dash(h.plugin_id),
            description: output::or_dash(h.description),
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
