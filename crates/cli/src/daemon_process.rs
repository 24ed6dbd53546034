// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading startup failures back out of the supervisor log.

use std::path::Path;

use cw_daemon::logging::{STARTUP_ERROR_PREFIX, STARTUP_MARKER_PREFIX};

/// Reason from the first startup error after the most recent start marker
pub fn parse_startup_error(log: &str) -> Option<String> {
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.iter().rposition(|line| line.starts_with(STARTUP_MARKER_PREFIX))?;
    lines[start + 1..].iter().find_map(|line| {
        line.find(STARTUP_ERROR_PREFIX)
            .map(|at| line[at + STARTUP_ERROR_PREFIX.len()..].trim().to_string())
    })
}

/// [`parse_startup_error`] over the log file; `None` when it can't be read
pub fn read_startup_error(log_path: &Path) -> Option<String> {
    std::fs::read_to_string(log_path).ok().and_then(|log| parse_startup_error(&log))
}

#[cfg(test)]
#[path = "daemon_process_tests.rs"]
mod tests;
