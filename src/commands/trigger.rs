//! `trigger`: fire a hook by name.

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use rimuru_hooks::{HookExecution, HookManager, HookStats, TriggerResponse};

use crate::output::{self, OutputFormat};

/// Arguments for the trigger command
#[derive(Debug, Args)]
pub struct TriggerArgs {
    /// Hook name, e.g. `on_cost_recorded` or any custom event name
    pub hook: String,

    /// Event payload as JSON
    #[arg(short, long)]
    pub data: Option<String>,

    /// Source recorded on the hook context
    #[arg(short, long, default_value = "cli")]
    pub source: String,

    /// Fire the hook this many times
    #[arg(short, long, default_value_t = 1)]
    pub repeat: u32,
}

/// Dispatch result row
#[derive(Debug, Serialize, Tabled)]
struct TriggerRow {
    /// Execution ID
    execution: String,
    /// Handlers
    handlers: usize,
    /// Aborted
    aborted: String,
    /// Reason
    reason: String,
}

/// Execution log row
#[derive(Debug, Serialize, Tabled)]
struct ExecutionRow {
    /// Execution ID
    execution: String,
    /// Handler
    handler: String,
    /// Status
    status: String,
    /// Duration
    duration_ms: u64,
    /// Detail
    detail: String,
}

impl From<&HookExecution> for ExecutionRow {
    fn from(e: &HookExecution) -> Self {
        Self {
            execution: output::short_id(&e.correlation_id.to_string()),
            handler: e.handler_name.clone(),
            status: e.status.to_string(),
            duration_ms: e.duration_ms,
            detail: output::or_dash(e.error.as_deref().or(e.message.as_deref())),
        }
    }
}

/// Full JSON report
#[derive(Debug, Serialize)]
struct TriggerReport<'a> {
    responses: &'a [TriggerResponse],
    executions: &'a [HookExecution],
    stats: HookStats,
}

/// Execute the trigger command
pub async fn execute(
    args: &TriggerArgs,
    manager: &HookManager,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let data = args
        .data
        .as_deref()
        .map(|s| serde_json::from_str::<serde_json::Value>(s))
        .transpose()
        .context("--data is not valid JSON")?;

    let mut responses = Vec::with_capacity(args.repeat as usize);
    for _ in 0..args.repeat.max(1) {
        let response = manager
            .trigger(&args.hook, data.clone(), Some(&args.source))
            .await
            .with_context(|| format!("failed to trigger '{}'", args.hook))?;
        responses.push(response);
    }

    let executions = manager.list_executions(Some(&args.hook), None).await;
    let stats = manager.get_stats().await;

    match format {
        OutputFormat::Json => output::print_json(&TriggerReport {
            responses: &responses,
            executions: &executions,
            stats,
        }),
        OutputFormat::Table => {
            let rows: Vec<TriggerRow> = responses
                .iter()
                .map(|r| TriggerRow {
                    execution: output::short_id(&r.execution_id.to_string()),
                    handlers: r.handlers_executed,
                    aborted: if r.aborted { "✓" } else { "✗" }.to_string(),
                    reason: output::or_dash(r.abort_reason.as_deref()),
                })
                .collect();
            output::print_list(&rows, format);

            output::print_heading("Executions");
            let rows: Vec<ExecutionRow> = executions.iter().rev().map(ExecutionRow::from).collect();
            output::print_list(&rows, format);

            output::print_heading("Stats");
            print_stats(&stats);

            if responses.iter().any(|r| r.aborted) {
                output::print_warning(&format!("'{}' was aborted by a handler", args.hook));
            }
        }
    }

    Ok(())
}

fn print_stats(stats: &HookStats) {
    output::print_kv("Hook types", &stats.total_hook_types.to_string());
    output::print_kv(
        "Handlers",
        &format!("{} ({} active)", stats.total_handlers, stats.active_handlers),
    );
    output::print_kv("Executions", &stats.total_executions.to_string());
    output::print_kv("Successful", &stats.successful_executions.to_string());
    output::print_kv("Failed", &stats.failed_executions.to_string());
    output::print_kv("Aborted", &stats.aborted_executions.to_string());
}
