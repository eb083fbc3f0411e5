//! Session snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{AgentId, SessionId};

/// Lifecycle state of an agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session is about to start.
    #[default]
    Starting,
    /// The session is running.
    Active,
    /// The session finished normally.
    Completed,
    /// The session ended with an error.
    Failed,
    /// The session was cancelled by the user or the host.
    Cancelled,
}

/// Point-in-time view of an agent session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    /// The session ID.
    pub session_id: SessionId,
    /// The agent running this session.
    pub agent_id: AgentId,
    /// Agent type (e.g. `"claude_code"`, `"cursor"`).
    pub agent_type: String,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended, if it has.
    pub ended_at: Option<DateTime<Utc>>,
    /// Tokens consumed so far.
    pub total_tokens: u64,
    /// Cost accrued so far, in USD.
    pub total_cost_usd: f64,
}

impl SessionSnapshot {
    /// Session length in seconds, if the session has ended.
    pub fn duration_secs(&self) -> Option<i64> {
        self.ended_at
            .map(|ended| (ended - self.started_at).num_seconds().max(0))
    }
}
