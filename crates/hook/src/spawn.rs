// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting the supervisor as a detached process.

use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::info;

use crate::transport::HookError;

/// Locate `crashwatchd`: `CW_DAEMON_BINARY` > next to the current exe > PATH
pub fn find_supervisor_binary() -> PathBuf {
    if let Ok(path) = std::env::var("CW_DAEMON_BINARY") {
        return PathBuf::from(path);
    }

    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        let sibling = dir.join("crashwatchd");
        if sibling.exists() {
            return sibling;
        }
    }

    PathBuf::from("crashwatchd")
}

/// Spawn `program` in its own process group so it outlives the caller.
///
/// Returns the child's PID. The child is reaped by a background thread.
pub fn spawn_supervisor(program: &Path) -> Result<u32, HookError> {
    let mut child = Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()?;
    let pid = child.id();
    info!(program = %program.display(), pid, "spawned supervisor");
    std::thread::spawn(move || {
        let _ = child.wait();
    });
    Ok(pid)
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
