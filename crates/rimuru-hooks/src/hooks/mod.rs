//! Hook system: definitions, configuration, registry, invoker,
//! dispatcher, and execution history.

pub mod config;
pub mod definitions;
pub mod dispatcher;
pub mod invoker;
pub mod recorder;
pub mod registry;

pub use config::{ConfigStore, HookConfig, HookConfigOverride};
pub use definitions::{Hook, HookContext, HookData, HookResult};
pub use dispatcher::{DispatchOutcome, HookDispatcher};
pub use invoker::HandlerInvoker;
pub use recorder::{ExecutionCounters, ExecutionRecorder, ExecutionStatus, HookExecution};
pub use registry::{HandlerInfo, HandlerRegistration, HookRegistry, RegistryCounts};
