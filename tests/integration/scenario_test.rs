//! Built-in handlers wired through the manager.

use std::sync::Arc;

use serde_json::json;

use rimuru_builtin_hooks::{CostAlertHandler, register_builtin_handlers};
use rimuru_core::config::{AppConfig, BuiltinHandlersConfig};
use rimuru_hooks::{HandlerRegistration, HookData, HookError, HookManager};

#[tokio::test]
async fn test_cost_alert_scenario() {
    let manager = HookManager::new();
    manager
        .register(HandlerRegistration::new(
            "cost-alert",
            Arc::new(CostAlertHandler::new(10.0)),
        ))
        .await
        .unwrap();

    let over = manager
        .trigger("on_cost_recorded", Some(json!({"cost_usd": 15.0})), None)
        .await
        .unwrap();
    assert!(over.aborted);
    assert_eq!(over.abort_reason.as_deref(), Some("Cost exceeds daily budget"));

    let under = manager
        .trigger("on_cost_recorded", Some(json!({"cost_usd": 5.0})), None)
        .await
        .unwrap();
    assert!(!under.aborted);
    assert_eq!(under.handlers_executed, 1);
}

#[tokio::test]
async fn test_session_start_can_be_refused_with_into_result() {
    let manager = HookManager::new();
    let config = BuiltinHandlersConfig::default();
    register_builtin_handlers(&manager, &config).await.unwrap();

    manager
        .register(HandlerRegistration::new(
            "gate",
            Arc::new(rimuru_hooks::ClosureHandler::new(
                "maintenance_gate",
                rimuru_hooks::Hook::PreSessionStart,
                1000,
                |_| async { Ok(rimuru_hooks::HookResult::abort("maintenance window")) },
            )),
        ))
        .await
        .unwrap();

    let outcome = manager
        .fire(
            rimuru_hooks::Hook::PreSessionStart,
            HookData::Session(Default::default()),
            "session-manager",
        )
        .await
        .unwrap();
    let err = outcome.into_result().unwrap_err();
    assert_eq!(
        err,
        HookError::Aborted {
            hook: "pre_session_start".into(),
            handler: "gate".into(),
            reason: "maintenance window".into(),
        }
    );
}

#[tokio::test]
async fn test_configured_manager_end_to_end() {
    let toml = r#"
        [hooks]
        default_timeout_ms = 500
        history_capacity = 10

        [builtin.cost_alert]
        threshold_usd = 1.0
        message = "Daily cap reached"

        [builtin.metrics_export]
        enabled = true
    "#;
    let config = AppConfig::from_toml_str(toml).unwrap();
    let manager = HookManager::from_config(&config.hooks).unwrap();
    let installed = register_builtin_handlers(&manager, &config.builtin)
        .await
        .unwrap();
    assert_eq!(installed.registered.len(), 4);

    let response = manager
        .trigger(
            "on_cost_recorded",
            Some(json!({"cost_usd": 2.5, "model": "sonnet"})),
            Some("cost-tracker"),
        )
        .await
        .unwrap();
    assert_eq!(response.abort_reason.as_deref(), Some("Daily cap reached"));

    let metrics = installed.metrics.expect("metrics exporter installed");
    manager
        .trigger("on_metrics_collected", Some(json!({"active_agents": 4})), None)
        .await
        .unwrap();
    assert_eq!(metrics.latest().map(|m| m.active_agents), Some(4));

    // Loading the builtin bundle fired on_plugin_loaded once.
    let types = manager.list_hook_types().await;
    let loaded = types.iter().find(|t| t.name == "on_plugin_loaded").unwrap();
    assert!(loaded.last_triggered.is_some());
}
