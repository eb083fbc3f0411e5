//! # rimuru-builtin-hooks
//!
//! Handlers that ship with Rimuru. Each one implements the
//! [`HookHandler`](rimuru_hooks::HookHandler) contract and nothing more;
//! [`register_builtin_handlers`] installs the ones enabled in configuration
//! as a single plugin bundle.

pub mod cost_alert;
pub mod metrics_export;
pub mod session_log;

use std::sync::Arc;

use rimuru_core::AppResult;
use rimuru_core::config::BuiltinHandlersConfig;
use rimuru_hooks::{HandlerRegistration, HookManager};
use validator::Validate;

pub use cost_alert::CostAlertHandler;
pub use metrics_export::MetricsExportHandler;
pub use session_log::{SessionLogHandler, SessionStartLogHandler};

/// Plugin id the built-in handlers are registered under.
pub const BUILTIN_PLUGIN_ID: &str = "rimuru-builtin";

/// What [`register_builtin_handlers`] installed.
#[derive(Debug, Default)]
pub struct BuiltinHandlers {
    /// Registered handler ids.
    pub registered: Vec<String>,
    /// The metrics exporter, when enabled, for subscribing to snapshots.
    pub metrics: Option<Arc<MetricsExportHandler>>,
}

/// Registers every built-in handler enabled in `config`.
///
/// All handlers go in as one bundle; if any is rejected none are kept.
pub async fn register_builtin_handlers(
    manager: &HookManager,
    config: &BuiltinHandlersConfig,
) -> AppResult<BuiltinHandlers> {
    config.validate()?;

    let mut registrations = Vec::new();
    let mut installed = BuiltinHandlers::default();

    if config.cost_alert.enabled {
        let handler = CostAlertHandler::from_config(&config.cost_alert);
        registrations.push(HandlerRegistration::new("builtin.cost_alert", Arc::new(handler)));
    }

    if config.session_log.enabled {
        let start = SessionStartLogHandler::from_config(&config.session_log);
        let end = SessionLogHandler::from_config(&config.session_log);
        registrations.push(HandlerRegistration::new("builtin.session_start_log", Arc::new(start)));
        registrations.push(HandlerRegistration::new("builtin.session_log", Arc::new(end)));
    }

    if config.metrics_export.enabled {
        let exporter = Arc::new(MetricsExportHandler::new(config.metrics_export.priority));
        registrations.push(HandlerRegistration::new("builtin.metrics_export", exporter.clone()));
        installed.metrics = Some(exporter);
    }

    if registrations.is_empty() {
        tracing::info!("No built-in hook handlers enabled");
        return Ok(installed);
    }

    installed.registered = registrations.iter().map(|r| r.id.clone()).collect();
    manager
        .register_plugin(BUILTIN_PLUGIN_ID, "Rimuru built-in handlers", registrations)
        .await?;

    tracing::info!(
        "Registered {} built-in hook handlers: {}",
        installed.registered.len(),
        installed.registered.join(", ")
    );
    Ok(installed)
}
