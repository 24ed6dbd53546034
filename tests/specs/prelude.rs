//! Shared scenario helpers

use std::sync::Arc;
use std::time::Duration;

pub use cw_adapters::{FakeLauncher, FakeNotifyAdapter, NotifySettings};
pub use cw_core::test_support::{error_payload, panic_payload};
pub use cw_daemon::{Config, CoordinatorHandle, Supervisor};
pub use cw_hook::{CrashHandler, Delivery, TransportHandle};
pub use cw_storage::FallbackStore;
pub use cw_wire::{Phase, SupervisorStatus};
pub use tempfile::TempDir;

/// Upper bound for any single wait in a scenario
pub const SPEC_WAIT: Duration = Duration::from_secs(5);

/// Supervisor plus the fakes it presents through
pub struct Stage {
    pub dir: TempDir,
    pub config: Config,
    pub notifier: FakeNotifyAdapter,
    pub launcher: FakeLauncher,
}

impl Stage {
    /// Fresh state and cache dirs with a fast poll budget
    pub fn new(interval_ms: u64, attempts: u32) -> Self {
        Self::with_notify(interval_ms, attempts, NotifySettings::default())
    }

    pub fn with_notify(interval_ms: u64, attempts: u32, notify: NotifySettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config =
            Config::for_dirs(dir.path().join("state"), dir.path().join("cache")).unwrap();
        config.settings.fallback_poll.interval_ms = interval_ms;
        config.settings.fallback_poll.attempts = attempts;
        Self {
            dir,
            config,
            notifier: FakeNotifyAdapter::with_settings(notify),
            launcher: FakeLauncher::new(),
        }
    }

    pub fn store(&self) -> FallbackStore {
        self.config.fallback_store()
    }

    pub async fn start(&self) -> Supervisor {
        Supervisor::start(self.config.clone(), self.notifier.clone(), self.launcher.clone())
            .await
            .unwrap()
    }

    /// A host bound to the supervisor socket
    pub async fn connected_host(&self) -> Host {
        let socket = self.config.socket_path.clone();
        let stream = tokio::task::spawn_blocking(move || cw_hook::connect(&socket, SPEC_WAIT))
            .await
            .unwrap()
            .unwrap();
        let transport = Arc::new(TransportHandle::new());
        transport.set(stream);
        Host::new(transport, self.store())
    }

    /// A host whose connection attempt already gave up
    pub fn offline_host(&self) -> Host {
        let transport = Arc::new(TransportHandle::new());
        transport.abandon();
        Host::new(transport, self.store())
    }
}

/// The crashing side of a scenario
pub struct Host {
    handler: Arc<CrashHandler>,
}

impl Host {
    fn new(transport: Arc<TransportHandle>, store: FallbackStore) -> Self {
        Self { handler: Arc::new(CrashHandler::new(transport, store, Duration::ZERO)) }
    }

    /// Run the crash path on a blocking thread, as a panic hook would
    pub async fn crash(&self, payload: cw_core::CrashPayload) -> Delivery {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.handle(&payload)).await.unwrap()
    }

    /// Close the connection, as process exit would
    pub fn exit(self) {
        drop(self);
    }
}

/// Wait for a status matching `predicate`, failing the scenario on timeout
pub async fn wait_status(
    handle: &CoordinatorHandle,
    predicate: impl FnMut(&SupervisorStatus) -> bool,
) -> SupervisorStatus {
    tokio::time::timeout(SPEC_WAIT, handle.wait_for(predicate))
        .await
        .expect("timed out waiting for supervisor status")
        .expect("coordinator went away")
}

/// Wait for the supervisor to stop on its own and tear it down
pub async fn wait_stopped(supervisor: Supervisor) -> SupervisorStatus {
    tokio::time::timeout(SPEC_WAIT, supervisor.run_until_stopped(std::future::pending()))
        .await
        .expect("supervisor did not stop")
}
