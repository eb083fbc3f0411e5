//! `hook-types`: list hook types.

use serde::Serialize;
use tabled::Tabled;

use rimuru_hooks::HookManager;

use crate::output::{self, OutputFormat};

/// Hook type display row
#[derive(Debug, Serialize, Tabled)]
struct HookTypeRow {
    /// Name
    name: String,
    /// Payload
    data_type: String,
    /// Handlers
    handlers: usize,
    /// Enabled
    enabled: String,
    /// Description
    description: String,
}

/// Execute the hook-types command
pub async fn execute(manager: &HookManager, format: OutputFormat) -> anyhow::Result<()> {
    let types = manager.list_hook_types().await;

    if format == OutputFormat::Json {
        output::print_json(&types);
        return Ok(());
    }

    let rows: Vec<HookTypeRow> = types
        .into_iter()
        .map(|t| HookTypeRow {
            name: t.name,
            data_type: t.data_type,
            handlers: t.handler_count,
            enabled: if t.enabled { "✓" } else { "✗" }.to_string(),
            description: t.description,
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
