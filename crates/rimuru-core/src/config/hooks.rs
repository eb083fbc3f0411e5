//! Hook engine configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Global hook engine settings plus per-hook overrides.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Per-handler time budget in milliseconds.
    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub default_timeout_ms: u64,
    /// Maximum handlers registered (and invoked) per hook.
    #[serde(default = "default_max_handlers")]
    #[validate(range(min = 1))]
    pub max_handlers: usize,
    /// Run handlers concurrently instead of one at a time.
    #[serde(default)]
    pub parallel: bool,
    /// Number of execution records retained in the audit ring buffer.
    #[serde(default = "default_history_capacity")]
    #[validate(range(min = 1))]
    pub history_capacity: usize,
    /// Per-hook overrides keyed by hook name (`on_cost_recorded`, or any
    /// custom event name).
    #[serde(default)]
    #[validate(nested)]
    pub overrides: HashMap<String, HookOverrideConfig>,
}

/// Per-hook override. Unset fields inherit the global value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct HookOverrideConfig {
    /// Per-handler time budget in milliseconds.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub timeout_ms: Option<u64>,
    /// Maximum handlers for this hook.
    #[serde(default)]
    #[validate(range(min = 1))]
    pub max_handlers: Option<usize>,
    /// Run this hook's handlers concurrently.
    #[serde(default)]
    pub parallel: Option<bool>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            max_handlers: default_max_handlers(),
            parallel: false,
            history_capacity: default_history_capacity(),
            overrides: HashMap::new(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_handlers() -> usize {
    32
}

fn default_history_capacity() -> usize {
    1000
}
