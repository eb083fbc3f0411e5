//! Hook identities, typed payloads, dispatch context, and handler results.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use rimuru_core::events::{
    AgentInfo, ConfigChange, CostRecord, ErrorReport, MetricsSnapshot, PluginInfo,
    SessionSnapshot, SyncSummary,
};
use rimuru_core::types::CorrelationId;

use crate::error::{EngineResult, HookError};

/// A named extension point raised by a Rimuru subsystem.
///
/// Serialises as its snake_case name. Any name that is not one of the
/// lifecycle hooks becomes [`Hook::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hook {
    // ── Session ──
    /// Fired before an agent session starts. Abort refuses the session.
    PreSessionStart,
    /// Fired after an agent session has ended.
    PostSessionEnd,

    // ── Accounting ──
    /// Fired when a cost record is posted.
    OnCostRecorded,
    /// Fired on every periodic metrics collection tick.
    OnMetricsCollected,

    // ── Agents ──
    /// Fired when an agent connects.
    OnAgentConnect,
    /// Fired when an agent disconnects.
    OnAgentDisconnect,

    // ── System ──
    /// Fired when a model/provider sync finishes.
    OnSyncComplete,
    /// Fired after a plugin's handlers are registered.
    OnPluginLoaded,
    /// Fired after a plugin's handlers are removed.
    OnPluginUnloaded,
    /// Fired when configuration values change.
    OnConfigChanged,
    /// Fired when a subsystem reports an error.
    OnError,

    /// Plugin-to-plugin signal identified by name.
    Custom(String),
}

impl Hook {
    /// The eleven lifecycle hooks, in declaration order.
    pub fn builtin() -> [Hook; 11] {
        [
            Self::PreSessionStart,
            Self::PostSessionEnd,
            Self::OnCostRecorded,
            Self::OnMetricsCollected,
            Self::OnAgentConnect,
            Self::OnAgentDisconnect,
            Self::OnSyncComplete,
            Self::OnPluginLoaded,
            Self::OnPluginUnloaded,
            Self::OnConfigChanged,
            Self::OnError,
        ]
    }

    /// Resolves a hook from its name. Unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        match name {
            "pre_session_start" => Self::PreSessionStart,
            "post_session_end" => Self::PostSessionEnd,
            "on_cost_recorded" => Self::OnCostRecorded,
            "on_metrics_collected" => Self::OnMetricsCollected,
            "on_agent_connect" => Self::OnAgentConnect,
            "on_agent_disconnect" => Self::OnAgentDisconnect,
            "on_sync_complete" => Self::OnSyncComplete,
            "on_plugin_loaded" => Self::OnPluginLoaded,
            "on_plugin_unloaded" => Self::OnPluginUnloaded,
            "on_config_changed" => Self::OnConfigChanged,
            "on_error" => Self::OnError,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Creates a plugin-defined hook. The name is trimmed, and a name
    /// that belongs to a lifecycle hook resolves to that hook.
    pub fn custom(name: impl AsRef<str>) -> Self {
        Self::from_name(name.as_ref())
    }

    /// Returns the canonical form of this hook, the one `from_name` would
    /// produce for its name.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Custom(name) => Self::from_name(name),
            other => other.clone(),
        }
    }

    /// Returns the hook name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PreSessionStart => "pre_session_start",
            Self::PostSessionEnd => "post_session_end",
            Self::OnCostRecorded => "on_cost_recorded",
            Self::OnMetricsCollected => "on_metrics_collected",
            Self::OnAgentConnect => "on_agent_connect",
            Self::OnAgentDisconnect => "on_agent_disconnect",
            Self::OnSyncComplete => "on_sync_complete",
            Self::OnPluginLoaded => "on_plugin_loaded",
            Self::OnPluginUnloaded => "on_plugin_unloaded",
            Self::OnConfigChanged => "on_config_changed",
            Self::OnError => "on_error",
            Self::Custom(name) => name,
        }
    }

    /// Returns whether this is a plugin-defined hook.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PreSessionStart => "Before an agent session starts; abort refuses the session",
            Self::PostSessionEnd => "After an agent session ends",
            Self::OnCostRecorded => "When a cost record is posted",
            Self::OnMetricsCollected => "When system metrics are collected",
            Self::OnAgentConnect => "When an agent connects",
            Self::OnAgentDisconnect => "When an agent disconnects",
            Self::OnSyncComplete => "When a model sync completes",
            Self::OnPluginLoaded => "After a plugin is loaded",
            Self::OnPluginUnloaded => "After a plugin is unloaded",
            Self::OnConfigChanged => "When configuration changes",
            Self::OnError => "When a subsystem reports an error",
            Self::Custom(_) => "Custom plugin event",
        }
    }

    /// The [`HookData`] kind this hook carries.
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::PreSessionStart | Self::PostSessionEnd => "session",
            Self::OnCostRecorded => "cost",
            Self::OnMetricsCollected => "metrics",
            Self::OnAgentConnect | Self::OnAgentDisconnect => "agent",
            Self::OnSyncComplete => "sync",
            Self::OnPluginLoaded | Self::OnPluginUnloaded => "plugin",
            Self::OnConfigChanged => "config",
            Self::OnError => "error",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Hook {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl Serialize for Hook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Hook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Event payload. The variant must correspond to the hook it is fired on;
/// see [`HookData::matches`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum HookData {
    /// No payload. Accepted by every hook.
    #[default]
    Empty,
    /// Session lifecycle snapshot.
    Session(SessionSnapshot),
    /// A posted cost record.
    Cost(CostRecord),
    /// A metrics collection tick.
    Metrics(MetricsSnapshot),
    /// Agent identity.
    Agent(AgentInfo),
    /// Sync result summary.
    Sync(SyncSummary),
    /// Plugin identity.
    Plugin(PluginInfo),
    /// Changed configuration keys.
    Config(ConfigChange),
    /// Reported error.
    Error(ErrorReport),
    /// Arbitrary JSON for custom hooks.
    Custom(Value),
}

impl HookData {
    /// Returns the payload kind tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Session(_) => "session",
            Self::Cost(_) => "cost",
            Self::Metrics(_) => "metrics",
            Self::Agent(_) => "agent",
            Self::Sync(_) => "sync",
            Self::Plugin(_) => "plugin",
            Self::Config(_) => "config",
            Self::Error(_) => "error",
            Self::Custom(_) => "custom",
        }
    }

    /// Returns whether this payload may be carried by `hook`.
    pub fn matches(&self, hook: &Hook) -> bool {
        matches!(self, Self::Empty) || self.kind() == hook.data_type()
    }

    /// Decodes caller-supplied JSON into the variant `hook` expects.
    ///
    /// `null` decodes to [`HookData::Empty`]. Missing fields take their
    /// defaults; a value of the wrong shape is rejected.
    pub fn from_json(hook: &Hook, value: Value) -> EngineResult<Self> {
        if value.is_null() {
            return Ok(Self::Empty);
        }

        let invalid = |e: serde_json::Error| HookError::InvalidPayload {
            hook: hook.to_string(),
            reason: format!("expected {} payload: {e}", hook.data_type()),
        };

        let data = match hook {
            Hook::PreSessionStart | Hook::PostSessionEnd => {
                Self::Session(serde_json::from_value(value).map_err(invalid)?)
            }
            Hook::OnCostRecorded => Self::Cost(serde_json::from_value(value).map_err(invalid)?),
            Hook::OnMetricsCollected => {
                Self::Metrics(serde_json::from_value(value).map_err(invalid)?)
            }
            Hook::OnAgentConnect | Hook::OnAgentDisconnect => {
                Self::Agent(serde_json::from_value(value).map_err(invalid)?)
            }
            Hook::OnSyncComplete => Self::Sync(serde_json::from_value(value).map_err(invalid)?),
            Hook::OnPluginLoaded | Hook::OnPluginUnloaded => {
                Self::Plugin(serde_json::from_value(value).map_err(invalid)?)
            }
            Hook::OnConfigChanged => Self::Config(serde_json::from_value(value).map_err(invalid)?),
            Hook::OnError => Self::Error(serde_json::from_value(value).map_err(invalid)?),
            Hook::Custom(_) => Self::Custom(value),
        };
        Ok(data)
    }

    /// Encodes the payload body (without the kind tag) as JSON.
    pub fn to_json(&self) -> Value {
        let encoded = match self {
            Self::Empty => return Value::Null,
            Self::Custom(value) => return value.clone(),
            Self::Session(v) => serde_json::to_value(v),
            Self::Cost(v) => serde_json::to_value(v),
            Self::Metrics(v) => serde_json::to_value(v),
            Self::Agent(v) => serde_json::to_value(v),
            Self::Sync(v) => serde_json::to_value(v),
            Self::Plugin(v) => serde_json::to_value(v),
            Self::Config(v) => serde_json::to_value(v),
            Self::Error(v) => serde_json::to_value(v),
        };
        encoded.unwrap_or(Value::Null)
    }

    /// Returns whether there is no payload.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the session snapshot, if any.
    pub fn as_session(&self) -> Option<&SessionSnapshot> {
        match self {
            Self::Session(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the cost record, if any.
    pub fn as_cost(&self) -> Option<&CostRecord> {
        match self {
            Self::Cost(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the metrics snapshot, if any.
    pub fn as_metrics(&self) -> Option<&MetricsSnapshot> {
        match self {
            Self::Metrics(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the custom JSON value, if any.
    pub fn as_custom(&self) -> Option<&Value> {
        match self {
            Self::Custom(v) => Some(v),
            _ => None,
        }
    }
}

/// Context handed to every handler of one dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookContext {
    /// Hook being fired.
    pub hook: Hook,
    /// Current payload. Replaced by `Modified` results in sequential mode.
    pub data: HookData,
    /// When the hook was fired.
    pub timestamp: DateTime<Utc>,
    /// Subsystem that fired the hook.
    pub source: String,
    /// Identifier shared by every execution of this dispatch.
    pub correlation_id: CorrelationId,
    /// Free-form key/value annotations from the caller.
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl HookContext {
    /// Default `source` when the caller names none.
    pub const DEFAULT_SOURCE: &'static str = "system";

    /// Creates a fresh context with a new correlation id.
    pub fn new(hook: Hook, data: HookData) -> Self {
        Self {
            hook: hook.normalized(),
            data,
            timestamp: Utc::now(),
            source: Self::DEFAULT_SOURCE.to_string(),
            correlation_id: CorrelationId::new(),
            metadata: HashMap::new(),
        }
    }

    /// Sets the firing subsystem.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Reuses an existing correlation id, e.g. to tie a hook to an
    /// upstream request.
    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns a copy carrying `data`, keeping identity and metadata.
    pub(crate) fn superseded(&self, data: HookData) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

/// Outcome a handler reports for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookResult {
    /// Proceed with the chain, payload unchanged.
    Continue,
    /// Veto: stop the chain and report `reason` to the caller.
    Abort {
        /// Reason surfaced to the caller.
        reason: String,
    },
    /// Replace the payload for subsequent handlers.
    Modified {
        /// Replacement payload.
        data: HookData,
        /// Optional note recorded with the execution.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The handler ran but opted out.
    Skip,
}

impl HookResult {
    /// Creates an `Abort` result.
    pub fn abort(reason: impl Into<String>) -> Self {
        Self::Abort {
            reason: reason.into(),
        }
    }

    /// Creates a `Modified` result without a message.
    pub fn modified(data: HookData) -> Self {
        Self::Modified {
            data,
            message: None,
        }
    }

    /// Creates a `Modified` result with a message.
    pub fn modified_with_message(data: HookData, message: impl Into<String>) -> Self {
        Self::Modified {
            data,
            message: Some(message.into()),
        }
    }

    /// Returns whether this result vetoes the chain.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort { .. })
    }
}
