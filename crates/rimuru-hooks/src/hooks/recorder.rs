//! Bounded execution history and running counters.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rimuru_core::types::{CorrelationId, ExecutionId};

use super::definitions::Hook;
use crate::error::{EngineResult, HookError};

/// Default number of retained executions.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// Outcome of one handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Continue, or an applied Modified.
    Success,
    /// The handler errored, panicked, or returned an unusable payload.
    Failure,
    /// The handler exceeded its time budget.
    Timeout,
    /// The handler vetoed the dispatch.
    Aborted,
    /// The handler opted out.
    Skipped,
}

impl ExecutionStatus {
    /// Returns the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Timeout => "timeout",
            Self::Aborted => "aborted",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookExecution {
    /// Record id.
    pub id: ExecutionId,
    /// Dispatch this invocation belonged to.
    pub correlation_id: CorrelationId,
    /// Hook that was fired.
    pub hook_type: Hook,
    /// Handler id.
    pub handler_id: String,
    /// Handler display name.
    pub handler_name: String,
    /// Outcome.
    pub status: ExecutionStatus,
    /// Invocation start.
    pub started_at: DateTime<Utc>,
    /// Invocation end.
    pub completed_at: DateTime<Utc>,
    /// Measured duration.
    pub duration_ms: u64,
    /// Error text for failures and timeouts.
    pub error: Option<String>,
    /// Abort reason or Modified message.
    pub message: Option<String>,
}

/// Running totals, updated on every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCounters {
    /// All recorded executions, including evicted ones.
    pub total: u64,
    /// Success and Skipped.
    pub successful: u64,
    /// Failure and Timeout.
    pub failed: u64,
    /// Aborted.
    pub aborted: u64,
}

impl ExecutionCounters {
    fn count(&mut self, status: ExecutionStatus) {
        self.total += 1;
        match status {
            ExecutionStatus::Success | ExecutionStatus::Skipped => self.successful += 1,
            ExecutionStatus::Failure | ExecutionStatus::Timeout => self.failed += 1,
            ExecutionStatus::Aborted => self.aborted += 1,
        }
    }
}

#[derive(Debug)]
struct RecorderState {
    history: VecDeque<HookExecution>,
    counters: ExecutionCounters,
}

/// Append-only ring buffer of [`HookExecution`]s.
#[derive(Debug)]
pub struct ExecutionRecorder {
    /// Maximum retained records.
    capacity: usize,
    /// Guarded state.
    state: RwLock<RecorderState>,
}

impl ExecutionRecorder {
    /// Creates a recorder retaining at most `capacity` records.
    pub fn new(capacity: usize) -> EngineResult<Self> {
        if capacity == 0 {
            return Err(HookError::InvalidConfig(
                "history_capacity must be positive".into(),
            ));
        }
        Ok(Self {
            capacity,
            state: RwLock::new(RecorderState {
                history: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
                counters: ExecutionCounters::default(),
            }),
        })
    }

    /// Returns the retention cap.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends one record, evicting the oldest when full.
    pub async fn record(&self, execution: HookExecution) {
        self.record_all(vec![execution]).await;
    }

    /// Appends a dispatch's records under one lock.
    pub async fn record_all(&self, executions: Vec<HookExecution>) {
        if executions.is_empty() {
            return;
        }
        let mut state = self.state.write().await;
        for execution in executions {
            state.counters.count(execution.status);
            if state.history.len() == self.capacity {
                state.history.pop_front();
            }
            state.history.push_back(execution);
        }
    }

    /// Returns retained records most recent first, optionally filtered by
    /// hook and truncated to `limit`.
    pub async fn query(&self, hook: Option<&Hook>, limit: Option<usize>) -> Vec<HookExecution> {
        let hook = hook.map(Hook::normalized);
        let state = self.state.read().await;
        state
            .history
            .iter()
            .rev()
            .filter(|e| hook.as_ref().is_none_or(|h| &e.hook_type == h))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Returns the records of one dispatch in invocation order.
    pub async fn by_correlation(&self, correlation_id: CorrelationId) -> Vec<HookExecution> {
        let state = self.state.read().await;
        state
            .history
            .iter()
            .filter(|e| e.correlation_id == correlation_id)
            .cloned()
            .collect()
    }

    /// Returns the running counters.
    pub async fn counters(&self) -> ExecutionCounters {
        self.state.read().await.counters
    }

    /// Number of retained records.
    pub async fn len(&self) -> usize {
        self.state.read().await.history.len()
    }

    /// Returns whether no records are retained.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.history.is_empty()
    }
}

impl Default for ExecutionRecorder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            state: RwLock::new(RecorderState {
                history: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY),
                counters: ExecutionCounters::default(),
            }),
        }
    }
}
