// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor status types for the IPC protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of the supervisor coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    WaitingForFallback,
    Active,
    Draining,
    Stopped,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Starting => "starting",
            Phase::WaitingForFallback => "waiting_for_fallback",
            Phase::Active => "active",
            Phase::Draining => "draining",
            Phase::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the supervisor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupervisorStatus {
    pub phase: Phase,
    pub pid: u32,
    pub uptime_secs: u64,
    /// Host processes currently bound
    pub bound_clients: usize,
    /// Crashes handed to presentation since start
    pub presented: u64,
    /// Whether the startup fallback poll has completed
    pub poll_finished: bool,
    pub stop_requested: bool,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
