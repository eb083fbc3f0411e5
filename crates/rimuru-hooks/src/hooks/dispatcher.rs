//! Hook dispatcher: runs one hook's handler chain and records every
//! invocation.
//!
//! Sequential mode (default):
//! - Handlers run one at a time in priority order.
//! - `Modified` replaces the payload seen by every later handler.
//! - `Abort` stops the chain.
//! - Errors and timeouts are recorded and the chain continues.
//!
//! Parallel mode:
//! - All handlers run concurrently, each under its own timeout.
//! - The highest-priority `Abort` supplies the abort reason.
//! - The highest-priority valid `Modified` becomes the final payload.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use rimuru_core::types::{CorrelationId, ExecutionId};

use super::config::ConfigStore;
use super::definitions::{Hook, HookContext, HookData, HookResult};
use super::invoker::HandlerInvoker;
use super::recorder::{ExecutionRecorder, ExecutionStatus, HookExecution};
use super::registry::{HandlerRegistration, HookRegistry};
use crate::error::{EngineResult, HookError};

/// Aggregate result of one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    /// Hook that was fired.
    pub hook: Hook,
    /// Correlation id shared by this dispatch's executions.
    pub correlation_id: CorrelationId,
    /// Handlers invoked, whatever their outcome.
    pub executed_count: usize,
    /// Whether a handler vetoed the dispatch.
    pub aborted: bool,
    /// Reason given by the aborting handler.
    pub abort_reason: Option<String>,
    /// Id of the aborting handler.
    pub aborted_by: Option<String>,
    /// Payload after all applied modifications.
    pub final_data: HookData,
    /// One record per invocation, in priority order.
    pub executions: Vec<HookExecution>,
}

impl DispatchOutcome {
    fn empty(ctx: &HookContext) -> Self {
        Self {
            hook: ctx.hook.clone(),
            correlation_id: ctx.correlation_id,
            executed_count: 0,
            aborted: false,
            abort_reason: None,
            aborted_by: None,
            final_data: ctx.data.clone(),
            executions: Vec::new(),
        }
    }

    /// Converts an aborted outcome into [`HookError::Aborted`].
    pub fn into_result(self) -> EngineResult<Self> {
        if self.aborted {
            return Err(HookError::Aborted {
                hook: self.hook.to_string(),
                handler: self
                    .aborted_by
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                reason: self
                    .abort_reason
                    .clone()
                    .unwrap_or_else(|| "Hook aborted execution".to_string()),
            });
        }
        Ok(self)
    }
}

/// One finished invocation before it is classified.
struct Invocation {
    started_at: DateTime<Utc>,
    elapsed: Duration,
    result: EngineResult<HookResult>,
}

/// Dispatches hooks to registered handlers.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
    /// Configuration store.
    config: Arc<ConfigStore>,
    /// Execution history.
    recorder: Arc<ExecutionRecorder>,
    /// Handler invoker.
    invoker: HandlerInvoker,
}

impl HookDispatcher {
    /// Creates a dispatcher over shared registry, config, and history.
    pub fn new(
        registry: Arc<HookRegistry>,
        config: Arc<ConfigStore>,
        recorder: Arc<ExecutionRecorder>,
    ) -> Self {
        Self {
            registry,
            config,
            recorder,
            invoker: HandlerInvoker::new(),
        }
    }

    /// Runs the enabled handlers of `ctx.hook` and records each invocation.
    ///
    /// Fails only when the payload does not fit the hook; handler faults
    /// are recorded, not returned.
    pub async fn execute(&self, mut ctx: HookContext) -> EngineResult<DispatchOutcome> {
        ctx.hook = ctx.hook.normalized();
        if !ctx.data.matches(&ctx.hook) {
            return Err(HookError::InvalidPayload {
                hook: ctx.hook.to_string(),
                reason: format!(
                    "expected {} payload, got {}",
                    ctx.hook.data_type(),
                    ctx.data.kind()
                ),
            });
        }

        let config = self.config.resolve(&ctx.hook).await;
        let mut handlers = self.registry.enabled_handlers(&ctx.hook).await;
        if handlers.len() > config.max_handlers {
            debug!(
                hook = %ctx.hook,
                enabled = handlers.len(),
                max_handlers = config.max_handlers,
                "Truncating handler chain"
            );
            handlers.truncate(config.max_handlers);
        }

        debug!(
            hook = %ctx.hook,
            correlation_id = %ctx.correlation_id,
            source = %ctx.source,
            handler_count = handlers.len(),
            parallel = config.parallel,
            "Dispatching hook"
        );

        let outcome = if config.parallel {
            self.run_parallel(&ctx, &handlers, config.timeout()).await
        } else {
            self.run_sequential(&ctx, &handlers, config.timeout()).await
        };

        self.recorder.record_all(outcome.executions.clone()).await;

        if outcome.aborted {
            info!(
                hook = %ctx.hook,
                correlation_id = %ctx.correlation_id,
                aborted_by = ?outcome.aborted_by,
                reason = ?outcome.abort_reason,
                "Hook dispatch aborted"
            );
        } else {
            debug!(
                hook = %ctx.hook,
                correlation_id = %ctx.correlation_id,
                executed = outcome.executed_count,
                "Hook dispatch completed"
            );
        }

        Ok(outcome)
    }

    async fn run_sequential(
        &self,
        ctx: &HookContext,
        handlers: &[HandlerRegistration],
        timeout: Duration,
    ) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::empty(ctx);
        let mut current = ctx.clone();

        for handler in handlers {
            let invocation = self.invoke_timed(handler, &current, timeout).await;
            let (execution, effect) = classify(ctx, handler, invocation);
            outcome.executions.push(execution);

            match effect {
                Effect::None => {}
                Effect::Modify(data) => current = current.superseded(data),
                Effect::Abort(reason) => {
                    outcome.aborted = true;
                    outcome.abort_reason = Some(reason);
                    outcome.aborted_by = Some(handler.id.clone());
                    break;
                }
            }
        }

        outcome.executed_count = outcome.executions.len();
        outcome.final_data = current.data;
        outcome
    }

    async fn run_parallel(
        &self,
        ctx: &HookContext,
        handlers: &[HandlerRegistration],
        timeout: Duration,
    ) -> DispatchOutcome {
        let invocations = join_all(
            handlers
                .iter()
                .map(|handler| self.invoke_timed(handler, ctx, timeout)),
        )
        .await;

        let mut outcome = DispatchOutcome::empty(ctx);
        let mut final_data = None;

        // `join_all` preserves input order, so the first hit is the
        // highest-priority one.
        for (handler, invocation) in handlers.iter().zip(invocations) {
            let (execution, effect) = classify(ctx, handler, invocation);
            outcome.executions.push(execution);

            match effect {
                Effect::None => {}
                Effect::Modify(data) => {
                    if final_data.is_none() {
                        final_data = Some(data);
                    }
                }
                Effect::Abort(reason) => {
                    if !outcome.aborted {
                        outcome.aborted = true;
                        outcome.abort_reason = Some(reason);
                        outcome.aborted_by = Some(handler.id.clone());
                    }
                }
            }
        }

        outcome.executed_count = outcome.executions.len();
        outcome.final_data = final_data.unwrap_or_else(|| ctx.data.clone());
        outcome
    }

    async fn invoke_timed(
        &self,
        handler: &HandlerRegistration,
        ctx: &HookContext,
        timeout: Duration,
    ) -> Invocation {
        let started_at = Utc::now();
        let clock = Instant::now();
        let result = self.invoker.invoke(handler, ctx, timeout).await;
        Invocation {
            started_at,
            elapsed: clock.elapsed(),
            result,
        }
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Returns the configuration store.
    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Returns the execution recorder.
    pub fn recorder(&self) -> &Arc<ExecutionRecorder> {
        &self.recorder
    }
}

/// What an invocation does to the rest of the dispatch.
enum Effect {
    None,
    Modify(HookData),
    Abort(String),
}

fn classify(
    ctx: &HookContext,
    handler: &HandlerRegistration,
    invocation: Invocation,
) -> (HookExecution, Effect) {
    let (status, error, message, effect) = match invocation.result {
        Ok(HookResult::Continue) => (ExecutionStatus::Success, None, None, Effect::None),
        Ok(HookResult::Skip) => (ExecutionStatus::Skipped, None, None, Effect::None),
        Ok(HookResult::Modified { data, message }) => {
            if data.matches(&ctx.hook) {
                (ExecutionStatus::Success, None, message, Effect::Modify(data))
            } else {
                let error = format!(
                    "handler returned {} payload for hook '{}'",
                    data.kind(),
                    ctx.hook
                );
                warn!(
                    hook = %ctx.hook,
                    handler_id = %handler.id,
                    error = %error,
                    "Discarding modified payload"
                );
                (ExecutionStatus::Failure, Some(error), message, Effect::None)
            }
        }
        Ok(HookResult::Abort { reason }) => (
            ExecutionStatus::Aborted,
            None,
            Some(reason.clone()),
            Effect::Abort(reason),
        ),
        Err(e @ HookError::HandlerTimeout { .. }) => {
            (ExecutionStatus::Timeout, Some(e.to_string()), None, Effect::None)
        }
        Err(e) => {
            warn!(
                hook = %ctx.hook,
                handler_id = %handler.id,
                error = %e,
                "Hook handler failed"
            );
            (ExecutionStatus::Failure, Some(e.to_string()), None, Effect::None)
        }
    };

    let duration_ms = u64::try_from(invocation.elapsed.as_millis()).unwrap_or(u64::MAX);
    let execution = HookExecution {
        id: ExecutionId::new(),
        correlation_id: ctx.correlation_id,
        hook_type: ctx.hook.clone(),
        handler_id: handler.id.clone(),
        handler_name: handler.name.clone(),
        status,
        started_at: invocation.started_at,
        completed_at: Utc::now(),
        duration_ms,
        error,
        message,
    };
    (execution, effect)
}
