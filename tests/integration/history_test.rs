//! Execution history and statistics.

use std::time::Duration;

use rimuru_core::config::HooksConfig;
use rimuru_hooks::{ExecutionStatus, Hook, HookManager};

use crate::helpers::{Behavior, add, call_log, evt, manager_with_timeout};

#[tokio::test]
async fn test_history_is_bounded() {
    let cfg = HooksConfig {
        history_capacity: 5,
        ..HooksConfig::default()
    };
    let manager = HookManager::from_config(&cfg).unwrap();
    let log = call_log();
    add(&manager, "only", evt(), 0, Behavior::Continue, &log).await;

    let mut ids = Vec::new();
    for _ in 0..6 {
        let response = manager.trigger("test_event", None, None).await.unwrap();
        ids.push(response.execution_id);
    }

    let recent = manager.list_executions(None, Some(5)).await;
    assert_eq!(recent.len(), 5);
    let expected: Vec<_> = ids[1..].iter().rev().copied().collect();
    let got: Vec<_> = recent.iter().map(|e| e.correlation_id).collect();
    assert_eq!(got, expected);
    assert!(manager.executions_for(ids[0]).await.is_empty());

    // Counters keep evicted executions.
    assert_eq!(manager.get_stats().await.total_executions, 6);
}

#[tokio::test]
async fn test_list_executions_filters_and_limits() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "e", Hook::OnError, 0, Behavior::Continue, &log).await;
    add(&manager, "c", evt(), 0, Behavior::Skip, &log).await;

    manager.trigger("on_error", None, None).await.unwrap();
    manager.trigger("test_event", None, None).await.unwrap();
    manager.trigger("on_error", None, None).await.unwrap();

    let errors = manager.list_executions(Some("on_error"), None).await;
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.hook_type == Hook::OnError));

    let latest = manager.list_executions(None, Some(1)).await;
    assert_eq!(latest[0].hook_type, Hook::OnError);

    let custom = manager.list_executions(Some("test_event"), None).await;
    assert_eq!(custom[0].status, ExecutionStatus::Skipped);
}

#[tokio::test(start_paused = true)]
async fn test_stats_count_timeout_as_failure() {
    let manager = manager_with_timeout(100).await;
    let log = call_log();
    add(&manager, "ok-1", evt(), 4, Behavior::Continue, &log).await;
    add(&manager, "ok-2", evt(), 3, Behavior::Continue, &log).await;
    add(&manager, "ok-3", evt(), 2, Behavior::Continue, &log).await;
    add(&manager, "slow", evt(), 1, Behavior::Sleep(Duration::from_secs(5)), &log).await;

    manager.trigger("test_event", None, None).await.unwrap();

    let stats = manager.get_stats().await;
    assert_eq!(stats.total_executions, 4);
    assert_eq!(stats.successful_executions, 3);
    assert_eq!(stats.failed_executions, 1);
    assert_eq!(stats.aborted_executions, 0);
}

#[tokio::test]
async fn test_one_record_per_invocation() {
    let manager = HookManager::new();
    let log = call_log();
    add(&manager, "skip", evt(), 3, Behavior::Skip, &log).await;
    add(&manager, "fail", evt(), 2, Behavior::Fail("nope"), &log).await;
    add(&manager, "abort", evt(), 1, Behavior::Abort("stop"), &log).await;
    add(&manager, "never", evt(), 0, Behavior::Continue, &log).await;

    let response = manager.trigger("test_event", None, Some("test")).await.unwrap();
    let statuses: Vec<_> = manager
        .executions_for(response.execution_id)
        .await
        .iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ExecutionStatus::Skipped,
            ExecutionStatus::Failure,
            ExecutionStatus::Aborted
        ]
    );

    let stats = manager.get_stats().await;
    assert_eq!(stats.successful_executions, 1);
    assert_eq!(stats.failed_executions, 1);
    assert_eq!(stats.aborted_executions, 1);
}
