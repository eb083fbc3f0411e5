//! System metrics snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Periodic metrics tick emitted by the metrics collector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    /// When the snapshot was collected.
    pub collected_at: DateTime<Utc>,
    /// Host CPU usage in percent.
    pub cpu_percent: f64,
    /// Resident memory in megabytes.
    pub memory_used_mb: f64,
    /// Sessions currently running.
    pub active_sessions: u32,
    /// Agents currently connected.
    pub active_agents: u32,
    /// Request rate over the last minute.
    pub requests_per_minute: f64,
    /// Cost accrued today, in USD.
    pub cost_today_usd: f64,
}
