//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rimuru_core::{AppError, AppResult};
use rimuru_hooks::{
    HandlerRegistration, Hook, HookConfig, HookContext, HookData, HookHandler, HookManager,
    HookResult,
};

/// What a mock handler does when invoked
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return `Continue`
    Continue,
    /// Return `Skip`
    Skip,
    /// Return `Abort` with this reason
    Abort(&'static str),
    /// Return `Modified` with this payload
    Modify(HookData),
    /// Return an error
    Fail(&'static str),
    /// Sleep, then return `Continue`
    Sleep(Duration),
}

/// Shared invocation log: handler name plus the payload it saw
pub type CallLog = Arc<Mutex<Vec<(String, HookData)>>>;

/// Configurable handler that records every call
pub struct MockHandler {
    name: String,
    hook: Hook,
    priority: i32,
    behavior: Behavior,
    log: CallLog,
}

impl MockHandler {
    /// Create a mock handler
    pub fn new(name: &str, hook: Hook, priority: i32, behavior: Behavior, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            hook,
            priority,
            behavior,
            log: Arc::clone(log),
        }
    }
}

#[async_trait]
impl HookHandler for MockHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn hook(&self) -> Hook {
        self.hook.clone()
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn invoke(&self, ctx: &HookContext) -> AppResult<HookResult> {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), ctx.data.clone()));

        match &self.behavior {
            Behavior::Continue => Ok(HookResult::Continue),
            Behavior::Skip => Ok(HookResult::Skip),
            Behavior::Abort(reason) => Ok(HookResult::abort(*reason)),
            Behavior::Modify(data) => Ok(HookResult::modified(data.clone())),
            Behavior::Fail(msg) => Err(AppError::internal(*msg)),
            Behavior::Sleep(d) => {
                tokio::time::sleep(*d).await;
                Ok(HookResult::Continue)
            }
        }
    }
}

/// Create an empty call log
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Names of the handlers in the log, in call order
pub fn called(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
}

/// Manager with a short per-handler timeout
pub async fn manager_with_timeout(timeout_ms: u64) -> HookManager {
    let manager = HookManager::new();
    manager
        .set_global_config(HookConfig {
            timeout_ms,
            ..HookConfig::default()
        })
        .await
        .expect("valid config");
    manager
}

/// Register a mock handler under its own name
pub async fn add(
    manager: &HookManager,
    name: &str,
    hook: Hook,
    priority: i32,
    behavior: Behavior,
    log: &CallLog,
) {
    let handler = MockHandler::new(name, hook, priority, behavior, log);
    manager
        .register(HandlerRegistration::new(name, Arc::new(handler)))
        .await
        .expect("registration succeeds");
}

/// Custom hook used by most tests
pub fn evt() -> Hook {
    Hook::Custom("test_event".to_string())
}
