//! Registration, capacity, plugin bundles, and listings.

use std::sync::Arc;

use rimuru_hooks::{
    HandlerRegistration, Hook, HookConfigOverride, HookError, HookManager, HookStats,
};

use crate::helpers::{Behavior, MockHandler, add, call_log, evt};

#[tokio::test]
async fn test_duplicate_registration_fails_atomically() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "dup", evt(), 10, Behavior::Continue, &log).await;
    let before = manager.list_handlers(None).await;
    let stats_before = manager.get_stats().await;

    let handler = MockHandler::new("dup", Hook::OnError, 99, Behavior::Continue, &log);
    let err = manager
        .register(HandlerRegistration::new("dup", Arc::new(handler)))
        .await
        .unwrap_err();
    assert_eq!(err, HookError::DuplicateId("dup".into()));

    assert_eq!(manager.list_handlers(None).await, before);
    assert_eq!(manager.get_stats().await, stats_before);
}

#[tokio::test]
async fn test_capacity_exceeded_uses_effective_config() {
    let manager = HookManager::new();
    manager
        .set_config(evt(), HookConfigOverride::default().with_max_handlers(2))
        .await
        .unwrap();
    let log = call_log();
    add(&manager, "one", evt(), 0, Behavior::Continue, &log).await;
    add(&manager, "two", evt(), 0, Behavior::Continue, &log).await;

    let handler = MockHandler::new("three", evt(), 0, Behavior::Continue, &log);
    let err = manager
        .register(HandlerRegistration::new("three", Arc::new(handler)))
        .await
        .unwrap_err();
    assert!(matches!(err, HookError::CapacityExceeded { max: 2, .. }));
    assert_eq!(manager.list_handlers(Some("test_event")).await.len(), 2);
}

#[tokio::test]
async fn test_plugin_bundle_is_all_or_nothing() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "taken", Hook::OnError, 0, Behavior::Continue, &log).await;

    let bundle = vec![
        HandlerRegistration::new(
            "budget.cost",
            Arc::new(MockHandler::new("cost", Hook::OnCostRecorded, 0, Behavior::Continue, &log)),
        ),
        HandlerRegistration::new(
            "taken",
            Arc::new(MockHandler::new("err", Hook::OnError, 0, Behavior::Continue, &log)),
        ),
    ];
    let err = manager
        .register_plugin("budget", "Budget", bundle)
        .await
        .unwrap_err();
    assert_eq!(err, HookError::DuplicateId("taken".into()));
    assert!(manager.list_handlers(Some("on_cost_recorded")).await.is_empty());

    // Nothing was announced for the failed load.
    let types = manager.list_hook_types().await;
    let loaded = types.iter().find(|t| t.name == "on_plugin_loaded").unwrap();
    assert!(loaded.last_triggered.is_none());
}

#[tokio::test]
async fn test_unregister_plugin_and_handler() {
    let manager = HookManager::new();
    let log = call_log();
    let bundle = vec![
        HandlerRegistration::new(
            "p.a",
            Arc::new(MockHandler::new("a", evt(), 0, Behavior::Continue, &log)),
        ),
        HandlerRegistration::new(
            "p.b",
            Arc::new(MockHandler::new("b", Hook::OnSyncComplete, 0, Behavior::Continue, &log)),
        ),
    ];
    assert_eq!(manager.register_plugin("p", "Plugin P", bundle).await.unwrap(), 2);
    add(&manager, "host", evt(), 0, Behavior::Continue, &log).await;

    let removed = manager.unregister_plugin("p").await;
    assert_eq!(removed.len(), 2);
    assert_eq!(manager.list_handlers(None).await.len(), 1);

    let info = manager.unregister("host").await.unwrap();
    assert_eq!(info.hook_type, evt());
    assert_eq!(
        manager.unregister("host").await.unwrap_err(),
        HookError::NotFound("host".into())
    );
}

#[tokio::test]
async fn test_stats_track_registrations_incrementally() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "a", evt(), 0, Behavior::Continue, &log).await;
    add(&manager, "b", evt(), 0, Behavior::Continue, &log).await;
    add(&manager, "c", Hook::OnError, 0, Behavior::Continue, &log).await;
    manager.disable_handler("b").await.unwrap();

    assert_eq!(
        manager.get_stats().await,
        HookStats {
            total_hook_types: 2,
            active_handlers: 2,
            total_handlers: 3,
            ..HookStats::default()
        }
    );

    manager.unregister("c").await.unwrap();
    let stats = manager.get_stats().await;
    assert_eq!(stats.total_hook_types, 1);
    assert_eq!(stats.total_handlers, 2);
    assert_eq!(stats.active_handlers, 1);
}

#[tokio::test]
async fn test_list_hook_types_reports_handlers() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "cost", Hook::OnCostRecorded, 0, Behavior::Continue, &log).await;
    add(&manager, "custom", evt(), 0, Behavior::Continue, &log).await;
    manager.disable_handler("custom").await.unwrap();

    let types = manager.list_hook_types().await;
    let cost = types.iter().find(|t| t.name == "on_cost_recorded").unwrap();
    assert_eq!(cost.handler_count, 1);
    assert!(cost.enabled);
    assert_eq!(cost.data_type, "cost");

    let custom = types.iter().find(|t| t.name == "test_event").unwrap();
    assert_eq!(custom.handler_count, 1);
    assert!(!custom.enabled);
}

#[tokio::test]
async fn test_concurrent_registration_and_dispatch() {
    let manager = Arc::new(HookManager::new());
    let log = call_log();

    let mut tasks = Vec::new();
    for i in 0..16 {
        let manager = Arc::clone(&manager);
        let log = Arc::clone(&log);
        tasks.push(tokio::spawn(async move {
            let name = format!("h{i:02}");
            let handler = MockHandler::new(&name, evt(), i, Behavior::Continue, &log);
            manager
                .register(HandlerRegistration::new(name, Arc::new(handler)))
                .await
                .unwrap();
            manager.trigger("test_event", None, None).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let listed = manager.list_handlers(Some("test_event")).await;
    assert_eq!(listed.len(), 16);
    let priorities: Vec<i32> = listed.iter().map(|h| h.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(priorities, sorted);
    assert_eq!(manager.get_stats().await.total_executions, log.lock().unwrap().len() as u64);
}
