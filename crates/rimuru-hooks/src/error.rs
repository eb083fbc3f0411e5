//! Error taxonomy for the hook engine.

use rimuru_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Convenience alias for fallible engine operations.
pub type EngineResult<T> = Result<T, HookError>;

/// Errors produced by registration, configuration, and dispatch.
///
/// `HandlerFailed` and `HandlerTimeout` never escape a dispatch; the
/// dispatcher records them as executions and moves on. They surface only
/// from [`HandlerInvoker`](crate::hooks::invoker::HandlerInvoker) itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// A handler with the same id is already registered.
    #[error("handler '{0}' is already registered")]
    DuplicateId(String),

    /// The hook already holds its maximum number of handlers.
    #[error("hook '{hook}' already has the maximum of {max} handlers")]
    CapacityExceeded {
        /// Hook name.
        hook: String,
        /// Effective `max_handlers` for the hook.
        max: usize,
    },

    /// The registration itself is malformed (empty id, hook mismatch).
    #[error("invalid handler registration: {0}")]
    InvalidRegistration(String),

    /// A configuration value is out of range.
    #[error("invalid hook configuration: {0}")]
    InvalidConfig(String),

    /// No handler with this id exists.
    #[error("handler '{0}' not found")]
    NotFound(String),

    /// The payload does not fit the hook it was fired on.
    #[error("payload for hook '{hook}' is invalid: {reason}")]
    InvalidPayload {
        /// Hook name.
        hook: String,
        /// What was wrong with the payload.
        reason: String,
    },

    /// A handler vetoed the dispatch.
    #[error("hook '{hook}' aborted by '{handler}': {reason}")]
    Aborted {
        /// Hook name.
        hook: String,
        /// Id of the aborting handler.
        handler: String,
        /// Reason given by the handler.
        reason: String,
    },

    /// A handler returned an error or panicked.
    #[error("handler '{handler}' failed: {message}")]
    HandlerFailed {
        /// Handler id.
        handler: String,
        /// Error text.
        message: String,
    },

    /// A handler did not finish within its time budget.
    #[error("handler '{handler}' timed out after {timeout_ms}ms")]
    HandlerTimeout {
        /// Handler id.
        handler: String,
        /// Budget that was exceeded.
        timeout_ms: u64,
    },
}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        let kind = match &err {
            HookError::DuplicateId(_) | HookError::CapacityExceeded { .. } => ErrorKind::Conflict,
            HookError::InvalidRegistration(_) | HookError::InvalidPayload { .. } => {
                ErrorKind::Validation
            }
            HookError::InvalidConfig(_) => ErrorKind::Configuration,
            HookError::NotFound(_) => ErrorKind::NotFound,
            HookError::Aborted { .. } => ErrorKind::Aborted,
            HookError::HandlerFailed { .. } => ErrorKind::Plugin,
            HookError::HandlerTimeout { .. } => ErrorKind::Timeout,
        };
        AppError::new(kind, err.to_string())
    }
}
