//! # rimuru-hooks
//!
//! Hook dispatch engine for Rimuru. Provides:
//!
//! - Typed hook identities and tagged event payloads
//! - A priority-ordered handler registry with enable/disable and plugin bundles
//! - Global and per-hook configuration (timeout, handler cap, concurrency mode)
//! - A dispatcher with Continue/Abort/Modified/Skip semantics, sequential or
//!   parallel, with per-handler timeouts and panic isolation
//! - A bounded execution history with running statistics

pub mod error;
pub mod handler;
pub mod hooks;
pub mod manager;
pub mod prelude;

pub use error::{EngineResult, HookError};
pub use handler::{ClosureHandler, HookHandler};
pub use hooks::config::{ConfigStore, HookConfig, HookConfigOverride};
pub use hooks::definitions::{Hook, HookContext, HookData, HookResult};
pub use hooks::dispatcher::{DispatchOutcome, HookDispatcher};
pub use hooks::recorder::{ExecutionRecorder, ExecutionStatus, HookExecution};
pub use hooks::registry::{HandlerInfo, HandlerRegistration, HookRegistry};
pub use manager::{HookManager, HookStats, HookTypeInfo, TriggerResponse};
