//! Session log handlers: one line per session start and end.

use async_trait::async_trait;

use rimuru_core::AppResult;
use rimuru_core::config::{SessionLogConfig, SessionLogFormat};
use rimuru_core::events::SessionSnapshot;
use rimuru_hooks::prelude::*;

fn render(snapshot: &SessionSnapshot, format: SessionLogFormat, event: &str) -> AppResult<String> {
    match format {
        SessionLogFormat::Json => {
            let mut value = serde_json::to_value(snapshot)?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("event".into(), event.into());
            }
            Ok(serde_json::to_string(&value)?)
        }
        SessionLogFormat::Text => {
            let duration = snapshot
                .duration_secs()
                .map(|s| format!("{s}s"))
                .unwrap_or_else(|| "-".to_string());
            Ok(format!(
                "session {} {event}: agent={} ({}) status={:?} tokens={} cost=${:.4} duration={duration}",
                snapshot.session_id,
                snapshot.agent_id,
                snapshot.agent_type,
                snapshot.status,
                snapshot.total_tokens,
                snapshot.total_cost_usd,
            ))
        }
    }
}

/// Logs a summary line when a session ends.
#[derive(Debug, Clone)]
pub struct SessionLogHandler {
    format: SessionLogFormat,
    priority: i32,
}

impl SessionLogHandler {
    /// Create a handler from configuration.
    pub fn from_config(config: &SessionLogConfig) -> Self {
        Self {
            format: config.format,
            priority: config.priority,
        }
    }

    /// Render the line this handler would log for `snapshot`.
    pub fn line(&self, snapshot: &SessionSnapshot) -> AppResult<String> {
        render(snapshot, self.format, "ended")
    }
}

#[async_trait]
impl HookHandler for SessionLogHandler {
    fn name(&self) -> &str {
        "session_log"
    }

    fn hook(&self) -> Hook {
        Hook::PostSessionEnd
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        "Logs a summary when a session ends"
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        let Some(snapshot) = ctx.data.as_session() else {
            return Ok(HookResult::Skip);
        };
        tracing::info!(target: "rimuru::session", "{}", self.line(snapshot)?);
        Ok(HookResult::Continue)
    }
}

/// Logs a line when a session starts.
#[derive(Debug, Clone)]
pub struct SessionStartLogHandler {
    format: SessionLogFormat,
    priority: i32,
}

impl SessionStartLogHandler {
    /// Create a handler from configuration.
    pub fn from_config(config: &SessionLogConfig) -> Self {
        Self {
            format: config.format,
            priority: config.priority,
        }
    }
}

#[async_trait]
impl HookHandler for SessionStartLogHandler {
    fn name(&self) -> &str {
        "session_start_log"
    }

    fn hook(&self) -> Hook {
        Hook::PreSessionStart
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        "Logs when a session starts"
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        let Some(snapshot) = ctx.data.as_session() else {
            return Ok(HookResult::Skip);
        };
        let line = render(snapshot, self.format, "starting")?;
        tracing::info!(target: "rimuru::session", "{}", line);
        Ok(HookResult::Continue)
    }
}
