//! Cost accounting records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{AgentId, CostRecordId, SessionId};

/// A single cost posting produced by the cost tracker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRecord {
    /// The record ID.
    pub id: CostRecordId,
    /// Agent that incurred the cost, if known.
    pub agent_id: Option<AgentId>,
    /// Session that incurred the cost, if known.
    pub session_id: Option<SessionId>,
    /// Model identifier (e.g. `"claude-sonnet"`).
    pub model: String,
    /// Prompt tokens billed.
    pub input_tokens: u64,
    /// Completion tokens billed.
    pub output_tokens: u64,
    /// Cost in USD.
    pub cost_usd: f64,
    /// When the cost was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl CostRecord {
    /// Total billed tokens.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
