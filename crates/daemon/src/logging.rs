// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor log file setup.
//!
//! The CLI reads the log after a failed start: it looks for the last
//! [`startup_marker`] and reports the first `ERROR` line after it.

use std::io::Write;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// File name of the supervisor log inside the state dir
pub const LOG_FILE_NAME: &str = "supervisor.log";

/// Prefix of the error line logged when startup fails
pub const STARTUP_ERROR_PREFIX: &str = "ERROR Failed to start supervisor: ";

/// Start of the line written before each supervisor start attempt
pub const STARTUP_MARKER_PREFIX: &str = "--- crashwatchd: starting";

pub fn startup_marker(pid: u32) -> String {
    format!("{STARTUP_MARKER_PREFIX} (pid: {pid}) ---")
}

/// Append the startup marker for this process to the log
pub fn write_startup_marker(state_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(state_dir)?;
    let mut log = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(state_dir.join(LOG_FILE_NAME))?;
    writeln!(log, "{}", startup_marker(std::process::id()))
}

/// Install the global subscriber writing to `<state_dir>/supervisor.log`.
///
/// Keep the returned guard alive for the life of the process so buffered
/// lines are flushed.
pub fn init(state_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(state_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(crate::env::log_filter())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init();
    guard
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
