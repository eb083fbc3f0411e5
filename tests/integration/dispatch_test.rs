//! Dispatch ordering, abort, modification threading, and fault isolation.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use rimuru_hooks::{ExecutionStatus, HookConfigOverride, HookData};

use crate::helpers::{Behavior, add, call_log, called, evt, manager_with_timeout};

#[tokio::test]
async fn test_priority_order_with_registration_tiebreak() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    add(&manager, "p10", evt(), 10, Behavior::Continue, &log).await;
    add(&manager, "p50-first", evt(), 50, Behavior::Continue, &log).await;
    add(&manager, "p100", evt(), 100, Behavior::Continue, &log).await;
    add(&manager, "p50-second", evt(), 50, Behavior::Continue, &log).await;

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(response.handlers_executed, 4);
    assert_eq!(
        called(&log),
        vec!["p100", "p50-first", "p50-second", "p10"]
    );
}

#[tokio::test]
async fn test_abort_short_circuits_chain() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    add(&manager, "a", evt(), 100, Behavior::Abort("vetoed by A"), &log).await;
    add(&manager, "b", evt(), 50, Behavior::Continue, &log).await;

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert!(response.aborted);
    assert!(!response.success);
    assert_eq!(response.abort_reason.as_deref(), Some("vetoed by A"));
    assert_eq!(response.handlers_executed, 1);
    assert_eq!(called(&log), vec!["a"]);
}

#[tokio::test]
async fn test_modified_data_visible_to_later_handlers() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    let x = HookData::Custom(json!({"rewritten": true}));
    add(&manager, "a", evt(), 100, Behavior::Modify(x.clone()), &log).await;
    add(&manager, "b", evt(), 50, Behavior::Continue, &log).await;

    let response = manager
        .trigger("test_event", Some(json!({"rewritten": false})), None)
        .await
        .unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(calls[0].1, HookData::Custom(json!({"rewritten": false})));
    assert_eq!(calls[1].1, x);
    assert_eq!(response.final_data, x);
}

#[tokio::test]
async fn test_modified_scoped_to_one_dispatch() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    add(
        &manager,
        "a",
        evt(),
        100,
        Behavior::Modify(HookData::Custom(json!("X"))),
        &log,
    )
    .await;

    manager.trigger("test_event", Some(json!("first")), None).await.unwrap();
    manager.trigger("test_event", Some(json!("second")), None).await.unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(calls[1].1, HookData::Custom(json!("second")));
}

#[tokio::test]
async fn test_handler_error_does_not_stop_chain() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    add(&manager, "broken", evt(), 100, Behavior::Fail("database unavailable"), &log).await;
    add(&manager, "after", evt(), 50, Behavior::Continue, &log).await;

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert!(response.success);
    assert_eq!(response.handlers_executed, 2);
    assert_eq!(called(&log), vec!["broken", "after"]);

    let executions = manager.executions_for(response.execution_id).await;
    assert_eq!(executions[0].status, ExecutionStatus::Failure);
    assert!(
        executions[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("database unavailable"))
    );
    assert_eq!(executions[1].status, ExecutionStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_isolated_and_chain_continues() {
    let manager = manager_with_timeout(200).await;
    let log = call_log();
    add(&manager, "slow", evt(), 100, Behavior::Sleep(Duration::from_secs(60)), &log).await;
    add(&manager, "next", evt(), 50, Behavior::Continue, &log).await;

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(called(&log), vec!["slow", "next"]);

    let executions = manager.executions_for(response.execution_id).await;
    assert_eq!(executions[0].status, ExecutionStatus::Timeout);
    assert!(executions[0].duration_ms >= 200 && executions[0].duration_ms < 220);
    assert_eq!(executions[1].status, ExecutionStatus::Success);
}

#[tokio::test]
async fn test_disabled_handler_not_invoked_but_listed() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    add(&manager, "a", evt(), 100, Behavior::Continue, &log).await;
    add(&manager, "b", evt(), 50, Behavior::Continue, &log).await;

    assert!(manager.disable_handler("a").await.unwrap());
    manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(called(&log), vec!["b"]);

    let listed = manager.list_handlers(Some("test_event")).await;
    assert_eq!(listed.len(), 2);
    let a = listed.iter().find(|h| h.id == "a").unwrap();
    assert!(!a.enabled);

    assert!(manager.enable_handler("a").await.unwrap());
    manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(called(&log), vec!["b", "a", "b"]);
}

#[tokio::test]
async fn test_parallel_mode_resolution() {
    let manager = manager_with_timeout(1000).await;
    manager
        .set_config(evt(), HookConfigOverride::default().with_parallel(true))
        .await
        .unwrap();

    let log = call_log();
    add(
        &manager,
        "low-mod",
        evt(),
        10,
        Behavior::Modify(HookData::Custom(json!("low"))),
        &log,
    )
    .await;
    add(
        &manager,
        "high-mod",
        evt(),
        90,
        Behavior::Modify(HookData::Custom(json!("high"))),
        &log,
    )
    .await;
    add(&manager, "mid-abort", evt(), 50, Behavior::Abort("mid"), &log).await;
    add(&manager, "low-abort", evt(), 5, Behavior::Abort("low"), &log).await;

    let response = manager.trigger("test_event", None, None).await.unwrap();
    // Every handler runs in parallel mode, even after an abort.
    assert_eq!(response.handlers_executed, 4);
    assert_eq!(called(&log).len(), 4);
    assert!(response.aborted);
    assert_eq!(response.abort_reason.as_deref(), Some("mid"));
    assert_eq!(response.final_data, HookData::Custom(json!("high")));
}

#[tokio::test(start_paused = true)]
async fn test_parallel_handlers_run_concurrently() {
    let manager = manager_with_timeout(1000).await;
    manager
        .set_config(evt(), HookConfigOverride::default().with_parallel(true))
        .await
        .unwrap();

    let log = call_log();
    for name in ["a", "b", "c"] {
        add(&manager, name, evt(), 0, Behavior::Sleep(Duration::from_millis(300)), &log).await;
    }

    let started = tokio::time::Instant::now();
    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(response.handlers_executed, 3);
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_truncates_to_max_handlers_at_dispatch() {
    let manager = manager_with_timeout(1000).await;
    let log = call_log();
    for (name, p) in [("a", 3), ("b", 2), ("c", 1)] {
        add(&manager, name, evt(), p, Behavior::Continue, &log).await;
    }
    manager
        .set_config(evt(), HookConfigOverride::default().with_max_handlers(2))
        .await
        .unwrap();

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(response.handlers_executed, 2);
    assert_eq!(called(&log), vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn test_parallel_timeout_isolated_from_siblings() {
    let manager = manager_with_timeout(100).await;
    manager
        .set_config(evt(), HookConfigOverride::default().with_parallel(true))
        .await
        .unwrap();

    let log = call_log();
    add(&manager, "fast", evt(), 30, Behavior::Continue, &log).await;
    add(&manager, "stuck", evt(), 20, Behavior::Sleep(Duration::from_secs(30)), &log).await;
    add(&manager, "quick", evt(), 10, Behavior::Sleep(Duration::from_millis(20)), &log).await;

    let started = tokio::time::Instant::now();
    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(150));
    assert!(response.success);
    assert_eq!(response.handlers_executed, 3);

    let executions = manager.executions_for(response.execution_id).await;
    let status_of = |id: &str| {
        executions
            .iter()
            .find(|e| e.handler_id == id)
            .map(|e| e.status)
    };
    assert_eq!(status_of("fast"), Some(ExecutionStatus::Success));
    assert_eq!(status_of("stuck"), Some(ExecutionStatus::Timeout));
    assert_eq!(status_of("quick"), Some(ExecutionStatus::Success));
}

#[tokio::test(start_paused = true)]
async fn test_registration_during_inflight_dispatch() {
    let manager = Arc::new(manager_with_timeout(1000).await);
    let log = call_log();
    add(&manager, "slow", evt(), 10, Behavior::Sleep(Duration::from_millis(500)), &log).await;

    let started = tokio::time::Instant::now();
    let inflight = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.trigger("test_event", None, None).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Registering does not wait for the running dispatch.
    add(&manager, "late", evt(), 50, Behavior::Continue, &log).await;
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!inflight.is_finished());

    let response = inflight.await.unwrap().unwrap();
    assert_eq!(response.handlers_executed, 1);
    assert_eq!(called(&log), vec!["slow"]);

    let response = manager.trigger("test_event", None, None).await.unwrap();
    assert_eq!(response.handlers_executed, 2);
    assert_eq!(called(&log), vec!["slow", "late", "slow"]);
}
