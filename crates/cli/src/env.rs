// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::time::Duration;

fn millis_var(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Per-request IPC timeout
pub fn ipc_timeout() -> Duration {
    millis_var("CW_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// How long `cw daemon start` waits for a fresh supervisor to answer
pub fn start_timeout() -> Duration {
    millis_var("CW_START_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}
