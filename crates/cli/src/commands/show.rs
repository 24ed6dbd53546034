// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cw show` - the crash screen

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use cw_core::{paths, CrashPayload};
use cw_storage::FallbackStore;

use crate::color::Palette;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Failure type
    #[arg(long = "type", required_unless_present = "pending")]
    pub kind: Option<String>,
    #[arg(long, required_unless_present = "pending")]
    pub message: Option<String>,
    /// Display of the underlying error, when there was one
    #[arg(long)]
    pub cause: Option<String>,
    #[arg(long, default_value = "")]
    pub stack_trace: String,
    /// Save the report and open it in the desktop's default viewer
    #[arg(long)]
    pub open: bool,
    /// Show (and consume) the crash waiting in the fallback record
    #[arg(long, conflicts_with_all = ["kind", "message", "cause"])]
    pub pending: bool,
}

pub fn show(args: ShowArgs, format: OutputFormat) -> Result<()> {
    let payload = if args.pending {
        let store = FallbackStore::in_dir(&paths::cache_dir()?);
        store.read_and_clear()?.ok_or_else(|| ExitError::new(1, "No pending crash"))?
    } else {
        CrashPayload::new(
            args.kind.unwrap_or_default(),
            args.message.unwrap_or_default(),
            args.cause,
            args.stack_trace,
        )
    };

    if args.open {
        let state_dir = paths::state_dir()?;
        let report = save_report(&state_dir.join("crashes"), &payload)?;
        match open_in_viewer(&report) {
            Ok(()) => return Ok(()),
            Err(e) => eprintln!("warning: {e}; printing instead"),
        }
    }

    format_or_json(format, &payload, || print!("{}", render(&payload, Palette::detect())))
}

/// Crash screen text for `payload`
pub fn render(payload: &CrashPayload, palette: Palette) -> String {
    let mut out = String::new();
    out.push_str(&palette.header("App crashed"));
    out.push('\n');
    out.push('\n');
    out.push_str(&palette.alert(&payload.headline()));
    out.push('\n');
    if let Some(cause) = payload.cause() {
        out.push_str(&format!("{} {}\n", palette.muted("Caused by:"), palette.context(cause)));
    }
    if !payload.stack_trace().is_empty() {
        out.push('\n');
        out.push_str(&palette.header("Stack trace"));
        out.push('\n');
        for frame in payload.stack_trace().lines() {
            out.push_str(&palette.literal(frame));
            out.push('\n');
        }
    }
    out
}

/// Write the plain crash screen to `<dir>/crash-<unix secs>.txt`
pub fn save_report(dir: &Path, payload: &CrashPayload) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    let path = dir.join(format!("crash-{secs}.txt"));
    std::fs::write(&path, render(payload, Palette::new(false)))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn open_in_viewer(path: &Path) -> Result<()> {
    let opener = if cfg!(target_os = "macos") { "open" } else { "xdg-open" };
    let status = Command::new(opener)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| anyhow!("could not run {opener}: {e}"))?;
    if !status.success() {
        return Err(anyhow!("{opener} exited with {status}"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "show_tests.rs"]
mod tests;
