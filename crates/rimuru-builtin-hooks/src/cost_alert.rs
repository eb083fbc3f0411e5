//! Cost alert handler: vetoes cost postings above a threshold.

use async_trait::async_trait;

use rimuru_core::AppResult;
use rimuru_core::config::CostAlertConfig;
use rimuru_hooks::prelude::*;

/// Aborts `on_cost_recorded` when a record's cost exceeds the threshold.
#[derive(Debug, Clone)]
pub struct CostAlertHandler {
    /// Threshold in USD.
    threshold_usd: f64,
    /// Abort reason.
    message: String,
    /// Priority.
    priority: i32,
}

impl CostAlertHandler {
    /// Default abort reason.
    pub const DEFAULT_MESSAGE: &'static str = "Cost exceeds daily budget";

    /// Create a handler with the default message and priority.
    pub fn new(threshold_usd: f64) -> Self {
        Self {
            threshold_usd,
            message: Self::DEFAULT_MESSAGE.to_string(),
            priority: 100,
        }
    }

    /// Create a handler from configuration.
    pub fn from_config(config: &CostAlertConfig) -> Self {
        Self {
            threshold_usd: config.threshold_usd,
            message: config.message.clone(),
            priority: config.priority,
        }
    }

    /// Returns the threshold.
    pub fn threshold_usd(&self) -> f64 {
        self.threshold_usd
    }
}

#[async_trait]
impl HookHandler for CostAlertHandler {
    fn name(&self) -> &str {
        "cost_alert"
    }

    fn hook(&self) -> Hook {
        Hook::OnCostRecorded
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        "Aborts cost postings above the configured threshold"
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        let Some(record) = ctx.data.as_cost() else {
            return Ok(HookResult::Skip);
        };

        if record.cost_usd > self.threshold_usd {
            tracing::warn!(
                "Cost alert: ${:.4} for model '{}' exceeds threshold ${:.2}",
                record.cost_usd,
                record.model,
                self.threshold_usd
            );
            return Ok(HookResult::abort(self.message.clone()));
        }

        Ok(HookResult::Continue)
    }
}
