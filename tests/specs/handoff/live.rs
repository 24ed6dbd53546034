//! Live handoff specs
//!
//! A host bound to a running supervisor hands its crash over the socket and
//! the supervisor opens the crash display directly.

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_crash_launches_display_without_record() {
    let stage = Stage::new(20, 3);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();
    let host = stage.connected_host().await;

    let delivery = host.crash(panic_payload("boom")).await;
    assert_eq!(delivery, Delivery::Delivered);

    let status = wait_status(&handle, |s| s.presented == 1).await;
    assert_eq!(status.bound_clients, 1);
    assert_eq!(stage.launcher.launched(), vec![panic_payload("boom")]);
    assert!(stage.notifier.calls().is_empty());
    assert!(!stage.store().exists(), "a delivered crash leaves no record");

    host.exit();
    let status = wait_stopped(supervisor).await;
    assert_eq!(status.phase, Phase::Stopped);
    assert!(!stage.config.socket_path.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stray_record_and_live_crash_present_once() {
    // Second attempt lands well after the live crash has cleared the record
    let stage = Stage::new(2000, 2);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();
    let host = stage.connected_host().await;
    wait_status(&handle, |s| s.bound_clients == 1).await;

    stage.store().write(&error_payload("failed to load", "permission denied")).unwrap();
    let delivery = host.crash(error_payload("failed to load", "permission denied")).await;
    assert_eq!(delivery, Delivery::Delivered);

    wait_status(&handle, |s| s.presented == 1).await;
    assert!(!stage.store().exists(), "the live crash clears the stray record");

    host.exit();
    let status = wait_stopped(supervisor).await;
    assert!(status.poll_finished);
    assert_eq!(status.presented, 1);
    assert_eq!(stage.launcher.launched().len(), 1);
    assert!(stage.notifier.calls().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_crash_event_is_presented() {
    let stage = Stage::new(20, 2);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();
    let host = stage.connected_host().await;

    host.crash(panic_payload("boom")).await;
    host.crash(panic_payload("boom")).await;
    host.crash(panic_payload("other")).await;

    wait_status(&handle, |s| s.presented == 3).await;
    let messages: Vec<String> =
        stage.launcher.launched().iter().map(|p| p.message().to_string()).collect();
    assert_eq!(messages, vec!["boom", "boom", "other"]);

    host.exit();
    wait_stopped(supervisor).await;
}
