// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching the crash display.

use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use cw_core::CrashPayload;
use thiserror::Error;

/// Errors from launching the viewer
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Opens the crash display for a payload
pub trait ViewerLauncher: Clone + Send + Sync + 'static {
    fn launch(&self, payload: &CrashPayload) -> Result<(), LaunchError>;
}

/// Launches the viewer as a detached child process.
///
/// The child gets `show --open` plus one flag per payload field, runs in
/// its own process group and is reaped by a background thread.
#[derive(Clone, Debug)]
pub struct CommandLauncher {
    program: PathBuf,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to the viewer for `payload`
    pub fn args(payload: &CrashPayload) -> Vec<String> {
        let mut args = vec![
            "show".to_string(),
            "--open".to_string(),
            "--type".to_string(),
            payload.kind().to_string(),
            "--message".to_string(),
            payload.message().to_string(),
        ];
        if let Some(cause) = payload.cause() {
            args.push("--cause".to_string());
            args.push(cause.to_string());
        }
        args.push("--stack-trace".to_string());
        args.push(payload.stack_trace().to_string());
        args
    }
}

impl ViewerLauncher for CommandLauncher {
    fn launch(&self, payload: &CrashPayload) -> Result<(), LaunchError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(payload))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        tracing::info!(
            program = %self.program.display(),
            pid = child.id(),
            "launched crash viewer"
        );
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{LaunchError, ViewerLauncher};
    use cw_core::CrashPayload;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake launcher that records every payload it was asked to show
    #[derive(Clone, Default)]
    pub struct FakeLauncher {
        launched: Arc<Mutex<Vec<CrashPayload>>>,
    }

    impl FakeLauncher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn launched(&self) -> Vec<CrashPayload> {
            self.launched.lock().clone()
        }
    }

    impl ViewerLauncher for FakeLauncher {
        fn launch(&self, payload: &CrashPayload) -> Result<(), LaunchError> {
            self.launched.lock().push(payload.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeLauncher;

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
