//! Fallback handoff specs
//!
//! A host with no supervisor connection persists its crash; the next
//! supervisor finds it during the startup poll and posts a notification.

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn offline_crash_is_recovered_by_next_supervisor() {
    let stage = Stage::new(20, 5);
    let host = stage.offline_host();

    let delivery = host.crash(error_payload("failed to load", "permission denied")).await;
    assert_eq!(delivery, Delivery::Persisted);
    let record = stage.store().peek().unwrap().unwrap();
    assert_eq!(record.kind(), "demo::ConfigError");
    assert_eq!(record.message(), "failed to load");
    assert_eq!(record.cause(), Some("permission denied"));
    assert!(!record.stack_trace().is_empty());

    let supervisor = stage.start().await;
    let status = wait_stopped(supervisor).await;

    assert_eq!(status.presented, 1);
    let calls = stage.notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].title, "App crashed");
    assert_eq!(calls[0].body, "Tap to see more info");
    assert_eq!(calls[0].channel_id, "CHANNEL_CRASHES");
    assert_eq!(calls[0].payload, record);
    assert!(stage.launcher.launched().is_empty());
    assert!(!stage.store().exists(), "record is consumed");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn late_record_is_found_within_poll_window() {
    let stage = Stage::new(50, 10);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();

    tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    stage.offline_host().crash(panic_payload("late")).await;

    let status = wait_status(&handle, |s| s.presented == 1).await;
    assert!(status.stop_requested);
    assert_eq!(stage.notifier.calls()[0].payload.message(), "late");
    wait_stopped(supervisor).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disabled_notifications_still_clear_record() {
    let notify = NotifySettings { enabled: false, ..NotifySettings::default() };
    let stage = Stage::with_notify(20, 3, notify);
    stage.offline_host().crash(panic_payload("quiet")).await;

    let supervisor = stage.start().await;
    wait_stopped(supervisor).await;

    assert!(stage.notifier.calls().is_empty());
    assert!(!stage.store().exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn corrupt_record_is_dropped() {
    let stage = Stage::new(20, 3);
    std::fs::create_dir_all(&stage.config.cache_dir).unwrap();
    std::fs::write(stage.store().path(), b"{ not a record").unwrap();

    let supervisor = stage.start().await;
    let handle = supervisor.handle();
    let status = wait_status(&handle, |s| s.poll_finished).await;

    assert_eq!(status.phase, Phase::Active);
    assert_eq!(status.presented, 0);
    assert!(!stage.store().exists());
    handle.send(cw_daemon::CoordinatorEvent::Shutdown).await.unwrap();
    wait_stopped(supervisor).await;
}
