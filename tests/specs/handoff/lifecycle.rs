//! Supervisor lifecycle specs
//!
//! The supervisor stays up while it may still have work: during the
//! fallback poll, and while any host is bound.

use crate::prelude::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_poll_leaves_supervisor_active() {
    let stage = Stage::new(10, 3);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();

    let status = wait_status(&handle, |s| s.poll_finished).await;

    assert_eq!(status.phase, Phase::Active);
    assert_eq!(status.presented, 0);
    assert!(stage.notifier.calls().is_empty());
    assert!(stage.launcher.launched().is_empty());
    assert!(stage.config.socket_path.exists());

    let status = supervisor.run_until_stopped(async {}).await;
    assert_eq!(status.phase, Phase::Stopped);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn host_leaving_mid_poll_defers_stop() {
    let stage = Stage::new(100, 5);
    let supervisor = stage.start().await;
    let handle = supervisor.handle();
    let host = stage.connected_host().await;
    wait_status(&handle, |s| s.bound_clients == 1).await;

    host.exit();

    let draining = wait_status(&handle, |s| s.bound_clients == 0).await;
    assert_eq!(draining.phase, Phase::Draining);
    assert!(!draining.poll_finished);

    let stopped = wait_stopped(supervisor).await;
    assert_eq!(stopped.phase, Phase::Stopped);
    assert!(stopped.poll_finished);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_supervisor_is_refused_while_first_runs() {
    let stage = Stage::new(10, 1);
    let supervisor = stage.start().await;

    let second = Supervisor::start(
        stage.config.clone(),
        stage.notifier.clone(),
        stage.launcher.clone(),
    )
    .await;

    assert!(matches!(second, Err(cw_daemon::LifecycleError::LockFailed(_))));
    assert!(stage.dir.path().join("state").join("supervisor.pid").exists());
    supervisor.run_until_stopped(async {}).await;
}
