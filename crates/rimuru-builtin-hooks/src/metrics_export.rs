//! Metrics export handler: publishes each metrics tick on a watch channel.

use async_trait::async_trait;
use tokio::sync::watch;

use rimuru_core::AppResult;
use rimuru_core::events::MetricsSnapshot;
use rimuru_hooks::prelude::*;

/// Publishes the latest `on_metrics_collected` snapshot to subscribers.
#[derive(Debug)]
pub struct MetricsExportHandler {
    priority: i32,
    tx: watch::Sender<Option<MetricsSnapshot>>,
}

impl MetricsExportHandler {
    /// Create an exporter with no snapshot yet.
    pub fn new(priority: i32) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { priority, tx }
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<Option<MetricsSnapshot>> {
        self.tx.subscribe()
    }

    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<MetricsSnapshot> {
        self.tx.borrow().clone()
    }
}

#[async_trait]
impl HookHandler for MetricsExportHandler {
    fn name(&self) -> &str {
        "metrics_export"
    }

    fn hook(&self) -> Hook {
        Hook::OnMetricsCollected
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        "Publishes metrics snapshots to subscribers"
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        let Some(snapshot) = ctx.data.as_metrics() else {
            return Ok(HookResult::Skip);
        };
        self.tx.send_replace(Some(snapshot.clone()));
        tracing::debug!(
            "Exported metrics: cpu={:.1}% sessions={} cost_today=${:.2}",
            snapshot.cpu_percent,
            snapshot.active_sessions,
            snapshot.cost_today_usd
        );
        Ok(HookResult::Continue)
    }
}
