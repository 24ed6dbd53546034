// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cw pending` - is a crash waiting in the fallback record?

use std::path::PathBuf;

use anyhow::Result;
use cw_core::{paths, CrashPayload};
use cw_storage::{FallbackStore, StoreError};
use serde::Serialize;

use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Debug, Serialize)]
pub struct PendingReport {
    pub path: PathBuf,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<CrashPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrupt: Option<String>,
}

/// Look at the record without consuming it
pub fn inspect(store: &FallbackStore) -> Result<PendingReport> {
    let (payload, corrupt) = match store.peek() {
        Ok(payload) => (payload, None),
        Err(StoreError::Corrupt(reason)) => (None, Some(reason)),
        Err(e) => return Err(e.into()),
    };
    Ok(PendingReport {
        path: store.path().to_path_buf(),
        pending: payload.is_some() || corrupt.is_some(),
        payload,
        corrupt,
    })
}

pub fn pending(format: OutputFormat) -> Result<()> {
    let store = FallbackStore::in_dir(&paths::cache_dir()?);
    let report = inspect(&store)?;

    format_or_json(format, &report, || match (&report.payload, &report.corrupt) {
        (Some(payload), _) => {
            println!("Pending crash: {}", payload.headline());
            println!("  Record: {}", report.path.display());
            println!("  Run `cw show --pending` to view and clear it");
        }
        (None, Some(reason)) => {
            println!("Unreadable crash record at {}: {}", report.path.display(), reason);
        }
        (None, None) => println!("No pending crash"),
    })?;

    if !report.pending {
        return Err(ExitError::new(1, "").into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
