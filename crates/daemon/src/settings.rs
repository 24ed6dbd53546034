// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional `config.toml` in the state directory.
//!
//! Every section and key is optional. Environment overrides win over the
//! file for the fallback poll budget.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cw_adapters::NotifySettings;
use serde::Deserialize;

use crate::coordinator::PollPolicy;
use crate::lifecycle::LifecycleError;

/// Name of the settings file inside the state dir
pub const SETTINGS_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub notifications: NotifySettings,
    pub fallback_poll: PollSettings,
    pub viewer: ViewerSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSettings {
    pub interval_ms: u64,
    pub attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { interval_ms: 500, attempts: 10 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerSettings {
    /// Program launched to show a crash; defaults to the `cw` binary
    pub program: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, LifecycleError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&text)
            .map_err(|e| LifecycleError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Fallback poll budget after environment overrides
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: crate::env::fallback_poll_interval()
                .unwrap_or(Duration::from_millis(self.fallback_poll.interval_ms)),
            attempts: crate::env::fallback_poll_attempts().unwrap_or(self.fallback_poll.attempts),
        }
    }

    /// Viewer program, falling back to `cw` next to the running binary
    pub fn viewer_program(&self) -> PathBuf {
        if let Some(program) = &self.viewer.program {
            return program.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("cw")))
            .filter(|candidate| candidate.exists())
            .unwrap_or_else(|| PathBuf::from("cw"))
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
