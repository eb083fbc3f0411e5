//! Domain records raised by Rimuru subsystems.
//!
//! These are the bodies that session lifecycle, cost accounting, metrics
//! collection, agent adapters, sync jobs, and the plugin host hand to the
//! hook engine. Every field carries a serde default so that loosely-shaped
//! JSON (from the CLI or a front end) still decodes into a usable record.

pub mod cost;
pub mod metrics;
pub mod session;
pub mod system;

pub use cost::CostRecord;
pub use metrics::MetricsSnapshot;
pub use session::{SessionSnapshot, SessionStatus};
pub use system::{AgentInfo, ConfigChange, ErrorReport, PluginInfo, SyncSummary};
