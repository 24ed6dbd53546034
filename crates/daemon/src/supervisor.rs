// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wiring for a running supervisor.

use std::fs::File;
use std::future::Future;
use std::sync::Arc;

use cw_adapters::{NotifyAdapter, ViewerLauncher};
use cw_wire::SupervisorStatus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::coordinator::{Coordinator, CoordinatorEvent, CoordinatorHandle, Presenter};
use crate::lifecycle::{self, Config, LifecycleError, StartupResult};
use crate::listener::{ListenCtx, Listener};

/// A started supervisor: socket bound, coordinator and listener running
pub struct Supervisor {
    config: Config,
    lock_file: File,
    handle: CoordinatorHandle,
    cancel: CancellationToken,
    listener: JoinHandle<()>,
    coordinator: JoinHandle<SupervisorStatus>,
}

impl Supervisor {
    /// Bind the socket and start the coordinator and listener tasks.
    ///
    /// Returns once clients can connect.
    pub async fn start<N, L>(
        config: Config,
        notifier: N,
        launcher: L,
    ) -> Result<Self, LifecycleError>
    where
        N: NotifyAdapter,
        L: ViewerLauncher,
    {
        let StartupResult { lock_file, listener } = lifecycle::startup(&config).await?;

        let policy = config.settings.poll_policy();
        info!(
            interval_ms = policy.interval.as_millis() as u64,
            attempts = policy.attempts,
            "fallback poll budget"
        );
        let (coordinator, handle) =
            Coordinator::new(config.fallback_store(), Presenter::new(notifier, launcher), policy);

        let cancel = CancellationToken::new();
        let ctx = Arc::new(ListenCtx {
            coordinator: handle.clone(),
            ipc_timeout: crate::env::ipc_timeout(),
        });
        let listener = tokio::spawn(Listener::new(listener, ctx).run(cancel.clone()));
        let coordinator = tokio::spawn(coordinator.run());

        Ok(Self { config, lock_file, handle, cancel, listener, coordinator })
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until the coordinator stops, then tear down.
    ///
    /// When `shutdown` resolves first a stop is requested, which the
    /// coordinator still defers until its fallback poll is done.
    pub async fn run_until_stopped(self, shutdown: impl Future<Output = ()>) -> SupervisorStatus {
        let handle = self.handle.clone();
        tokio::select! {
            _ = handle.stopped() => {}
            _ = shutdown => {
                info!("shutdown signal received");
                let _ = handle.send(CoordinatorEvent::Shutdown).await;
                handle.stopped().await;
            }
        }
        self.teardown().await
    }

    async fn teardown(self) -> SupervisorStatus {
        let Self { config, lock_file, handle, cancel, listener, coordinator } = self;
        cancel.cancel();
        let _ = listener.await;
        let status = match coordinator.await {
            Ok(status) => status,
            Err(_) => handle.status(),
        };
        lifecycle::shutdown(&config, lock_file);
        status
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
