// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup poll for a crash recorded by a previous run.
//!
//! A host that failed to reach the supervisor may still be writing its
//! record when the supervisor starts, so the store is checked repeatedly
//! over a bounded window.

use std::time::Duration;

use cw_storage::{FallbackStore, StoreError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::CoordinatorEvent;

/// How long to keep looking for a fallback record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_millis(500), attempts: 10 }
    }
}

/// Poll the store, reporting any record found and then `PollFinished`.
///
/// Stops early once a record is claimed. Always reports `PollFinished`
/// unless the coordinator is gone.
pub(crate) async fn poll_fallback(
    store: FallbackStore,
    policy: PollPolicy,
    events: mpsc::Sender<CoordinatorEvent>,
) {
    for attempt in 1..=policy.attempts {
        match store.read_and_clear() {
            Ok(Some(payload)) => {
                info!(attempt, "found fallback crash record");
                if events.send(CoordinatorEvent::FallbackFound { payload }).await.is_err() {
                    return;
                }
                break;
            }
            Ok(None) => debug!(attempt, "no fallback crash record"),
            Err(StoreError::Corrupt(reason)) => {
                warn!(attempt, %reason, "discarded corrupt fallback record")
            }
            Err(e) => warn!(attempt, error = %e, "failed to read fallback record"),
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    let _ = events.send(CoordinatorEvent::PollFinished).await;
}
