//! Agent, sync, plugin, configuration, and error event bodies.

use serde::{Deserialize, Serialize};

use crate::types::id::AgentId;

/// An agent connecting to or disconnecting from the platform.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentInfo {
    /// The agent ID.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Agent type (e.g. `"claude_code"`).
    #[serde(rename = "type")]
    pub agent_type: String,
}

/// Outcome of a model catalogue sync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSummary {
    /// Provider that was synced (e.g. `"anthropic"`).
    pub provider: String,
    /// Number of models written.
    pub models_synced: u32,
    /// Wall-clock time of the sync in milliseconds.
    pub duration_ms: u64,
}

/// A plugin being loaded or unloaded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginInfo {
    /// Plugin identifier.
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
}

/// A configuration change notification.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigChange {
    /// Dotted keys that changed (e.g. `"hooks.default_timeout_ms"`).
    pub changed_keys: Vec<String>,
}

/// An error surfaced by any subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorReport {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Subsystem that raised the error.
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_type_field_is_named_type() {
        let agent: AgentInfo =
            serde_json::from_value(serde_json::json!({"name": "cc", "type": "claude_code"}))
                .expect("decode");
        assert_eq!(agent.agent_type, "claude_code");

        let value = serde_json::to_value(&agent).expect("encode");
        assert_eq!(value["type"], "claude_code");
    }
}
