//! Bounded-time execution of a single handler call.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use super::definitions::{HookContext, HookResult};
use super::registry::HandlerRegistration;
use crate::error::{EngineResult, HookError};

/// Runs one handler on its own task under a deadline.
///
/// Handler errors and panics come back as [`HookError::HandlerFailed`], an
/// expired deadline as [`HookError::HandlerTimeout`]. On expiry the task is
/// aborted, which takes effect at the handler's next await point.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlerInvoker;

impl HandlerInvoker {
    /// Creates an invoker.
    pub fn new() -> Self {
        Self
    }

    /// Invokes `registration` with `ctx`, waiting at most `timeout`.
    pub async fn invoke(
        &self,
        registration: &HandlerRegistration,
        ctx: &HookContext,
        timeout: Duration,
    ) -> EngineResult<HookResult> {
        let handler = Arc::clone(&registration.handler);
        let ctx = ctx.clone();
        let mut task = tokio::spawn(async move { handler.invoke(&ctx).await });

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => Err(HookError::HandlerFailed {
                handler: registration.id.clone(),
                message: e.to_string(),
            }),
            Ok(Err(join_err)) => {
                let message = if join_err.is_panic() {
                    format!("handler panicked: {}", panic_message(join_err.into_panic()))
                } else {
                    "handler task was cancelled".to_string()
                };
                error!(
                    handler_id = %registration.id,
                    error = %message,
                    "Hook handler task failed"
                );
                Err(HookError::HandlerFailed {
                    handler: registration.id.clone(),
                    message,
                })
            }
            Err(_) => {
                task.abort();
                let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(
                    handler_id = %registration.id,
                    timeout_ms,
                    "Hook handler timed out"
                );
                Err(HookError::HandlerTimeout {
                    handler: registration.id.clone(),
                    timeout_ms,
                })
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
