// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Send-or-persist decision for one crash.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cw_core::CrashPayload;
use cw_storage::FallbackStore;
use tracing::{debug, warn};

use crate::transport::TransportHandle;

const GRACE_POLL: Duration = Duration::from_millis(10);

/// Where a crash ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written to the live supervisor connection
    Delivered,
    /// Written to the fallback record for the next supervisor start
    Persisted,
    /// Neither path worked
    Lost,
}

/// Routes a processed crash to the supervisor or the fallback record
#[derive(Debug)]
pub struct CrashHandler {
    transport: Arc<TransportHandle>,
    store: FallbackStore,
    grace: Duration,
}

impl CrashHandler {
    pub fn new(transport: Arc<TransportHandle>, store: FallbackStore, grace: Duration) -> Self {
        Self { transport, store, grace }
    }

    pub fn transport(&self) -> &TransportHandle {
        &self.transport
    }

    /// Deliver `payload` exactly one way.
    ///
    /// Waits up to the grace period for a pending connection. Never panics.
    pub fn handle(&self, payload: &CrashPayload) -> Delivery {
        self.wait_for_connection();

        match self.transport.send(payload) {
            Ok(()) => {
                debug!(kind = payload.kind(), "crash sent to supervisor");
                return Delivery::Delivered;
            }
            Err(e) => debug!(error = %e, "supervisor unavailable, using fallback record"),
        }

        match self.store.write(payload) {
            Ok(()) => Delivery::Persisted,
            Err(e) => {
                warn!(path = %self.store.path().display(), error = %e, "crash report lost");
                Delivery::Lost
            }
        }
    }

    fn wait_for_connection(&self) {
        let deadline = Instant::now() + self.grace;
        while self.transport.is_pending() && Instant::now() < deadline {
            std::thread::sleep(GRACE_POLL);
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
