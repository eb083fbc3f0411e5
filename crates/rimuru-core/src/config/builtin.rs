//! Built-in handler configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the handlers that ship with Rimuru.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct BuiltinHandlersConfig {
    /// Daily budget guard on `on_cost_recorded`.
    #[serde(default)]
    #[validate(nested)]
    pub cost_alert: CostAlertConfig,
    /// Session start/end log lines.
    #[serde(default)]
    pub session_log: SessionLogConfig,
    /// Metrics tick export.
    #[serde(default)]
    pub metrics_export: MetricsExportConfig,
}

/// Cost alert handler configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct CostAlertConfig {
    /// Whether the handler is registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cost in USD above which the posting is vetoed.
    #[serde(default = "default_threshold")]
    #[validate(range(min = 0.0))]
    pub threshold_usd: f64,
    /// Handler priority (higher runs earlier).
    #[serde(default = "default_cost_alert_priority")]
    pub priority: i32,
    /// Abort reason reported to the caller.
    #[serde(default = "default_cost_alert_message")]
    #[validate(length(min = 1))]
    pub message: String,
}

impl Default for CostAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_usd: default_threshold(),
            priority: default_cost_alert_priority(),
            message: default_cost_alert_message(),
        }
    }
}

/// Output format for session log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLogFormat {
    /// Single human-readable line.
    #[default]
    Text,
    /// The full session snapshot as JSON.
    Json,
}

/// Session log handler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionLogConfig {
    /// Whether the handlers are registered at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Line format.
    #[serde(default)]
    pub format: SessionLogFormat,
    /// Handler priority.
    #[serde(default)]
    pub priority: i32,
}

impl Default for SessionLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: SessionLogFormat::default(),
            priority: 0,
        }
    }
}

/// Metrics export handler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsExportConfig {
    /// Whether the handler is registered at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Handler priority.
    #[serde(default)]
    pub priority: i32,
}

fn default_true() -> bool {
    true
}

fn default_threshold() -> f64 {
    10.0
}

fn default_cost_alert_priority() -> i32 {
    100
}

fn default_cost_alert_message() -> String {
    "Cost exceeds daily budget".to_string()
}
