// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor lifecycle management: configuration, startup, shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::PathBuf;

use cw_core::paths;
use cw_storage::FallbackStore;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::settings::{Settings, SETTINGS_FILE_NAME};

/// Supervisor configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/crashwatch)
    pub state_dir: PathBuf,
    /// Directory holding the fallback record
    pub cache_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to supervisor log file
    pub log_path: PathBuf,
    /// Path to the optional settings file
    pub settings_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Load configuration from the environment and the settings file
    pub fn load() -> Result<Self, LifecycleError> {
        Self::for_dirs(paths::state_dir()?, paths::cache_dir()?)
    }

    /// Configuration rooted at explicit directories
    pub fn for_dirs(state_dir: PathBuf, cache_dir: PathBuf) -> Result<Self, LifecycleError> {
        let settings_path = state_dir.join(SETTINGS_FILE_NAME);
        let settings = Settings::load(&settings_path)?;
        Ok(Self {
            socket_path: paths::socket_path(&state_dir),
            lock_path: state_dir.join("supervisor.pid"),
            log_path: state_dir.join(crate::logging::LOG_FILE_NAME),
            settings_path,
            settings,
            state_dir,
            cache_dir,
        })
    }

    pub fn fallback_store(&self) -> FallbackStore {
        FallbackStore::in_dir(&self.cache_dir)
    }
}

/// Result of supervisor startup
pub struct StartupResult {
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    pub lock_file: File,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

/// Remove the socket and PID file.
///
/// The lock is released when `lock_file` is dropped at the end.
pub fn shutdown(config: &Config, lock_file: File) {
    info!("Shutting down supervisor...");

    if config.socket_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.socket_path) {
            warn!("Failed to remove socket file: {}", e);
        }
    }

    if config.lock_path.exists() {
        if let Err(e) = std::fs::remove_file(&config.lock_path) {
            warn!("Failed to remove PID file: {}", e);
        }
    }

    drop(lock_file);
    info!("Supervisor shutdown complete");
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine directory: {0}")]
    NoStateDir(#[from] paths::PathError),

    #[error("Failed to acquire lock: supervisor already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Invalid settings: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
