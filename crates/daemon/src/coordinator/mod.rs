// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor coordinator.
//!
//! One task owns every piece of mutable supervisor state and consumes
//! events from the listener, the fallback poll and shutdown requests in
//! arrival order. Other tasks hold a [`CoordinatorHandle`] and never touch
//! the state directly.

mod poll;
mod presenter;

pub use poll::PollPolicy;
pub use presenter::{Presentation, Presenter, Route, SuppressReason};

use std::collections::HashSet;

use cw_adapters::{NotifyAdapter, ViewerLauncher};
use cw_core::CrashPayload;
use cw_storage::FallbackStore;
use cw_wire::{Phase, SupervisorStatus};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identity of one bound host connection
pub type ClientId = Uuid;

const EVENT_QUEUE_CAPACITY: usize = 64;

/// Inputs to the coordinator state machine
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    ClientBound { client: ClientId },
    ClientUnbound { client: ClientId },
    /// Crash delivered live by a bound host
    Crash { payload: CrashPayload },
    /// Crash recovered from the fallback record
    FallbackFound { payload: CrashPayload },
    PollFinished,
    Shutdown,
}

impl CoordinatorEvent {
    fn name(&self) -> &'static str {
        match self {
            CoordinatorEvent::ClientBound { .. } => "client_bound",
            CoordinatorEvent::ClientUnbound { .. } => "client_unbound",
            CoordinatorEvent::Crash { .. } => "crash",
            CoordinatorEvent::FallbackFound { .. } => "fallback_found",
            CoordinatorEvent::PollFinished => "poll_finished",
            CoordinatorEvent::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Error)]
#[error("coordinator has stopped")]
pub struct CoordinatorGone;

/// Cloneable, non-owning way to talk to the coordinator
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<CoordinatorEvent>,
    status: watch::Receiver<SupervisorStatus>,
    started: Instant,
}

impl CoordinatorHandle {
    /// Queue an event; fails once the coordinator has stopped
    pub async fn send(&self, event: CoordinatorEvent) -> Result<(), CoordinatorGone> {
        self.tx.send(event).await.map_err(|_| CoordinatorGone)
    }

    /// Latest published status
    pub fn status(&self) -> SupervisorStatus {
        let mut status = self.status.borrow().clone();
        status.uptime_secs = self.started.elapsed().as_secs();
        status
    }

    pub fn phase(&self) -> Phase {
        self.status.borrow().phase
    }

    /// Wait until a published status satisfies `predicate`.
    ///
    /// Returns `None` if the coordinator went away first.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&SupervisorStatus) -> bool,
    ) -> Option<SupervisorStatus> {
        let mut rx = self.status.clone();
        let status = rx.wait_for(|s| predicate(s)).await.ok()?.clone();
        Some(status)
    }

    /// Wait for the coordinator to reach `Stopped` (or disappear)
    pub async fn stopped(&self) {
        let _ = self.wait_for(|s| s.phase == Phase::Stopped).await;
    }
}

/// The supervisor state machine
pub struct Coordinator<N, L> {
    store: FallbackStore,
    presenter: Presenter<N, L>,
    policy: PollPolicy,
    events: mpsc::Receiver<CoordinatorEvent>,
    poll_tx: mpsc::Sender<CoordinatorEvent>,
    status: watch::Sender<SupervisorStatus>,
    phase: Phase,
    clients: HashSet<ClientId>,
    poll_finished: bool,
    stop_requested: bool,
    shutdown_requested: bool,
    presented: u64,
}

impl<N: NotifyAdapter, L: ViewerLauncher> Coordinator<N, L> {
    pub fn new(
        store: FallbackStore,
        presenter: Presenter<N, L>,
        policy: PollPolicy,
    ) -> (Self, CoordinatorHandle) {
        let (tx, events) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (status, status_rx) = watch::channel(SupervisorStatus {
            phase: Phase::Starting,
            pid: std::process::id(),
            uptime_secs: 0,
            bound_clients: 0,
            presented: 0,
            poll_finished: false,
            stop_requested: false,
        });
        let coordinator = Self {
            store,
            presenter,
            policy,
            events,
            poll_tx: tx.clone(),
            status,
            phase: Phase::Starting,
            clients: HashSet::new(),
            poll_finished: false,
            stop_requested: false,
            shutdown_requested: false,
            presented: 0,
        };
        let handle = CoordinatorHandle { tx, status: status_rx, started: Instant::now() };
        (coordinator, handle)
    }

    /// Start the fallback poll and process events until stopped
    pub async fn run(mut self) -> SupervisorStatus {
        tokio::spawn(poll::poll_fallback(self.store.clone(), self.policy, self.poll_tx.clone()));
        self.update_phase();

        while self.phase != Phase::Stopped {
            let Some(event) = self.events.recv().await else {
                break;
            };
            self.apply(event).await;
        }

        // Crashes queued behind the stopping event must still be presented.
        self.events.close();
        while let Ok(event) = self.events.try_recv() {
            match event {
                CoordinatorEvent::Crash { payload } => self.on_live_crash(payload).await,
                CoordinatorEvent::FallbackFound { payload } => {
                    self.on_fallback_crash(payload).await
                }
                other => debug!(event = other.name(), "ignored after stop"),
            }
        }
        self.status.send_replace(self.snapshot());

        info!(presented = self.presented, "coordinator stopped");
        self.snapshot()
    }

    /// Apply one event and republish status
    pub(crate) async fn apply(&mut self, event: CoordinatorEvent) {
        debug!(event = event.name(), phase = %self.phase, "coordinator event");
        match event {
            CoordinatorEvent::ClientBound { client } => {
                self.clients.insert(client);
                info!(%client, clients = self.clients.len(), "client bound");
            }
            CoordinatorEvent::ClientUnbound { client } => {
                if self.clients.remove(&client) {
                    info!(%client, clients = self.clients.len(), "client unbound");
                    if self.clients.is_empty() {
                        self.stop_requested = true;
                    }
                }
            }
            CoordinatorEvent::Crash { payload } => self.on_live_crash(payload).await,
            CoordinatorEvent::FallbackFound { payload } => self.on_fallback_crash(payload).await,
            CoordinatorEvent::PollFinished => {
                self.poll_finished = true;
                info!("fallback poll finished");
            }
            CoordinatorEvent::Shutdown => {
                info!("shutdown requested");
                self.stop_requested = true;
                self.shutdown_requested = true;
            }
        }
        self.update_phase();
    }

    async fn on_live_crash(&mut self, payload: CrashPayload) {
        info!(kind = payload.kind(), "received crash from host");
        // A live report supersedes anything left on disk for the same crash.
        match self.store.clear() {
            Ok(true) => debug!("cleared fallback record"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to clear fallback record"),
        }
        self.present(payload, Route::DirectLaunch).await;
        self.stop_requested = true;
    }

    async fn on_fallback_crash(&mut self, payload: CrashPayload) {
        info!(kind = payload.kind(), "recovered crash from previous run");
        self.present(payload, Route::Notification).await;
        self.stop_requested = true;
    }

    /// One presentation per crash event. Equal payloads from separate
    /// events are separate crashes.
    async fn present(&mut self, payload: CrashPayload, route: Route) {
        self.presented += 1;
        let outcome = self.presenter.present(&payload, route).await;
        debug!(?route, ?outcome, "crash handed to presentation");
    }

    fn next_phase(&self) -> Phase {
        let idle = self.clients.is_empty() || self.shutdown_requested;
        match (self.poll_finished, self.stop_requested && idle) {
            (true, true) => Phase::Stopped,
            (false, true) => Phase::Draining,
            (false, false) => Phase::WaitingForFallback,
            (true, false) => Phase::Active,
        }
    }

    fn update_phase(&mut self) {
        let next = self.next_phase();
        if next != self.phase {
            info!(from = %self.phase, to = %next, "phase changed");
            self.phase = next;
        }
        self.status.send_replace(self.snapshot());
    }

    fn snapshot(&self) -> SupervisorStatus {
        SupervisorStatus {
            phase: self.phase,
            pid: std::process::id(),
            uptime_secs: 0,
            bound_clients: self.clients.len(),
            presented: self.presented,
            poll_finished: self.poll_finished,
            stop_requested: self.stop_requested,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
