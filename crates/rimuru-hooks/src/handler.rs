//! The handler contract and a closure-based implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use rimuru_core::AppResult;

use crate::hooks::definitions::{Hook, HookContext, HookResult};

/// Logic bound to one hook.
///
/// Returning `Err` marks this invocation as a failure; the rest of the chain
/// still runs. Only [`HookResult::Abort`] stops a dispatch.
#[async_trait]
pub trait HookHandler: Send + Sync + 'static {
    /// Display name recorded in executions.
    fn name(&self) -> &str;

    /// Hook this handler responds to.
    fn hook(&self) -> Hook;

    /// Execution priority (higher runs first).
    fn priority(&self) -> i32 {
        0
    }

    /// Optional description shown in handler listings.
    fn description(&self) -> &str {
        ""
    }

    /// Handles one invocation.
    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult>;
}

type BoxedHandlerFn = Arc<
    dyn Fn(HookContext) -> Pin<Box<dyn Future<Output = AppResult<HookResult>> + Send>>
        + Send
        + Sync,
>;

/// A closure-based hook handler for quick handler creation.
pub struct ClosureHandler {
    /// Handler name.
    name: String,
    /// Bound hook.
    hook: Hook,
    /// Priority.
    priority_val: i32,
    /// Description.
    description: String,
    /// Handler function.
    handler: BoxedHandlerFn,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("name", &self.name)
            .field("hook", &self.hook)
            .field("priority_val", &self.priority_val)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler. The closure receives an owned
    /// copy of the context.
    pub fn new<F, Fut>(name: &str, hook: Hook, priority: i32, handler: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<HookResult>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            hook,
            priority_val: priority,
            description: String::new(),
            handler: Arc::new(move |ctx| Box::pin(handler(ctx))),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn hook(&self) -> Hook {
        self.hook.clone()
    }

    fn priority(&self) -> i32 {
        self.priority_val
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        (self.handler)(ctx.clone()).await
    }
}
