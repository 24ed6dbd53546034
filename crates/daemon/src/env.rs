// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the supervisor crate.

use std::time::Duration;

fn millis_var(name: &str) -> Option<Duration> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    millis_var("CW_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Fallback poll interval override
pub fn fallback_poll_interval() -> Option<Duration> {
    millis_var("CW_FALLBACK_POLL_MS")
}

/// Fallback poll attempt count override
pub fn fallback_poll_attempts() -> Option<u32> {
    std::env::var("CW_FALLBACK_POLL_ATTEMPTS").ok().and_then(|s| s.parse::<u32>().ok())
}

/// Log filter directive: CW_LOG > RUST_LOG > "info"
pub fn log_filter() -> String {
    std::env::var("CW_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}
