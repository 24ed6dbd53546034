// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known locations shared by the host hook, supervisor and CLI.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// File name of the single-slot fallback record inside the cache dir
pub const FALLBACK_FILE_NAME: &str = "lastCrash.bin";

/// File name of the supervisor socket inside the state dir
pub const SOCKET_FILE_NAME: &str = "supervisor.sock";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("could not determine {0} directory (HOME not set)")]
    NoHome(&'static str),
}

/// Resolve state directory: CW_STATE_DIR > XDG_STATE_HOME/crashwatch > ~/.local/state/crashwatch
pub fn state_dir() -> Result<PathBuf, PathError> {
    if let Ok(dir) = std::env::var("CW_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("crashwatch"));
    }
    let home = std::env::var("HOME").map_err(|_| PathError::NoHome("state"))?;
    Ok(PathBuf::from(home).join(".local/state/crashwatch"))
}

/// Resolve cache directory: CW_CACHE_DIR > XDG_CACHE_HOME/crashwatch > platform cache dir
pub fn cache_dir() -> Result<PathBuf, PathError> {
    if let Ok(dir) = std::env::var("CW_CACHE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        return Ok(PathBuf::from(xdg).join("crashwatch"));
    }
    dirs::cache_dir().map(|d| d.join("crashwatch")).ok_or(PathError::NoHome("cache"))
}

pub fn socket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SOCKET_FILE_NAME)
}

pub fn fallback_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(FALLBACK_FILE_NAME)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
