// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable fallback record for crashes that could not be sent live.
//!
//! One slot at a well-known path. Presence means "a crash happened and
//! nobody has consumed it yet". Writes go through a temp file and a rename,
//! so a reader sees either nothing or a complete record. Reads claim the
//! record with a rename before decoding it, so two concurrent readers can
//! never both get the same crash.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use cw_core::CrashPayload;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Current record schema version
pub const RECORD_VERSION: u32 = 1;

static UNIQUE: AtomicU64 = AtomicU64::new(0);

/// Errors that can occur in fallback store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt fallback record: {0}")]
    Corrupt(String),
}

#[derive(Serialize)]
struct RecordRef<'a> {
    #[serde(rename = "v")]
    version: u32,
    payload: &'a CrashPayload,
}

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "v")]
    version: u32,
    payload: CrashPayload,
}

/// Single-slot on-disk crash record
#[derive(Debug, Clone)]
pub struct FallbackStore {
    path: PathBuf,
}

impl FallbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<cache_dir>/lastCrash.bin`
    pub fn in_dir(cache_dir: &Path) -> Self {
        Self::new(cw_core::paths::fallback_path(cache_dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Persist `payload`, replacing any existing record.
    ///
    /// Synchronous and fsynced before returning: the caller is usually a
    /// thread that is about to die.
    pub fn write(&self, payload: &CrashPayload) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&RecordRef { version: RECORD_VERSION, payload })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.sibling("tmp");
        let result = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        // Make the rename itself durable
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    /// Take the record out of the slot.
    ///
    /// Returns `Ok(None)` when the slot is empty (or another reader won the
    /// race). A record that cannot be decoded is deleted and reported as
    /// [`StoreError::Corrupt`].
    pub fn read_and_clear(&self) -> Result<Option<CrashPayload>, StoreError> {
        let claimed = self.sibling("claimed");
        match fs::rename(&self.path, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let bytes = fs::read(&claimed);
        if let Err(e) = fs::remove_file(&claimed) {
            warn!(
                path = %claimed.display(),
                error = %e,
                "failed to remove claimed fallback record"
            );
        }

        let payload = decode(&bytes?)?;
        debug!(path = %self.path.display(), "consumed fallback record");
        Ok(Some(payload))
    }

    /// Read the record without consuming it
    pub fn peek(&self) -> Result<Option<CrashPayload>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => decode(&bytes).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the record if present; returns whether one was removed.
    pub fn clear(&self) -> Result<bool, StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Unique path next to the record (`lastCrash.bin.<pid>.<n>.<suffix>`)
    fn sibling(&self, suffix: &str) -> PathBuf {
        let n = UNIQUE.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().map(|s| s.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.{}.{}", std::process::id(), n, suffix));
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn decode(bytes: &[u8]) -> Result<CrashPayload, StoreError> {
    let record: Record =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    if record.version != RECORD_VERSION {
        return Err(StoreError::Corrupt(format!("unsupported record version {}", record.version)));
    }
    Ok(record.payload)
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
