// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exception processor: turns a panic or a fatal error into a [`CrashPayload`].
//!
//! This runs on a thread that is about to die, so nothing here may panic.
//! Anything that cannot be formatted is left out of the payload instead.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};

use crate::payload::CrashPayload;

/// `type` recorded for panics
pub const PANIC_KIND: &str = "panic";

const UNPRINTABLE: &str = "<unprintable>";
const NO_FRAMES: &str = "    (no backtrace captured)";

/// Byte caps per field. With worst-case JSON escaping (6x) an encoded
/// payload still fits one 4 MiB frame.
pub const MAX_KIND_BYTES: usize = 1024;
pub const MAX_TEXT_BYTES: usize = 64 * 1024;
pub const MAX_STACK_TRACE_BYTES: usize = 512 * 1024;

const TRUNCATED: &str = " [truncated]";

/// Build a payload from a panic, as seen by a panic hook.
///
/// Runs inside the panic hook: a second panic here would abort the process,
/// so only non-panicking formatting is used (no user `Display` impls).
pub fn process_panic(info: &PanicHookInfo<'_>, backtrace: &Backtrace) -> CrashPayload {
    let thread = std::thread::current();
    let location = info.location().map(|l| l.to_string());
    build_panic_payload(
        panic_message(info.payload()),
        location.as_deref(),
        thread.name(),
        &backtrace_text(backtrace),
    )
}

/// Build a payload from a fatal error the host decided to report.
pub fn process_error<E: Error + 'static>(err: &E, backtrace: &Backtrace) -> CrashPayload {
    process_dyn_error(std::any::type_name::<E>(), err, backtrace)
}

/// Like [`process_error`], for errors only known as trait objects.
pub fn process_dyn_error(
    kind: &str,
    err: &(dyn Error + 'static),
    backtrace: &Backtrace,
) -> CrashPayload {
    let message = guarded_display(err).unwrap_or_else(|| UNPRINTABLE.to_string());

    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(e) = source {
        // Dropped from the chain rather than aborting the report
        if let Some(text) = guarded_display(e) {
            chain.push(text);
        }
        source = e.source();
    }

    let mut lines = format_frames(&backtrace_text(backtrace));
    if lines.is_empty() {
        lines.push(NO_FRAMES.to_string());
    }
    lines.extend(chain.iter().map(|c| format!("Caused by: {c}")));

    bounded_payload(kind, message, chain.first().cloned(), lines.join("\n"))
}

/// Extract the message from a panic payload (`&str` or `String`).
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "Box<dyn Any>"
    }
}

pub(crate) fn build_panic_payload(
    message: &str,
    location: Option<&str>,
    thread: Option<&str>,
    raw_backtrace: &str,
) -> CrashPayload {
    let thread = thread.unwrap_or("<unnamed>");
    let header = match location {
        Some(loc) => format!("thread '{thread}' panicked at {loc}"),
        None => format!("thread '{thread}' panicked"),
    };

    let mut lines = vec![header];
    let frames = format_frames(raw_backtrace);
    if frames.is_empty() {
        lines.push(NO_FRAMES.to_string());
    } else {
        lines.extend(frames);
    }

    bounded_payload(PANIC_KIND, message.to_string(), None, lines.join("\n"))
}

fn bounded_payload(
    kind: &str,
    message: String,
    cause: Option<String>,
    stack_trace: String,
) -> CrashPayload {
    CrashPayload::new(
        truncate(kind.to_string(), MAX_KIND_BYTES),
        truncate(message, MAX_TEXT_BYTES),
        cause.map(|c| truncate(c, MAX_TEXT_BYTES)),
        truncate(stack_trace, MAX_STACK_TRACE_BYTES),
    )
}

/// Cut `text` to at most `max` bytes on a char boundary, marking the cut
pub(crate) fn truncate(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text.push_str(TRUNCATED);
    text
}

fn backtrace_text(backtrace: &Backtrace) -> String {
    match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string(),
        _ => String::new(),
    }
}

fn guarded_display(err: &(dyn Error + 'static)) -> Option<String> {
    panic::catch_unwind(AssertUnwindSafe(|| err.to_string())).ok()
}

/// Fold std's backtrace rendering into one `    at symbol (file:line)` line
/// per frame.
///
/// Frames outside the `__rust_end_short_backtrace` /
/// `__rust_begin_short_backtrace` markers are runtime plumbing and dropped.
pub fn format_frames(raw: &str) -> Vec<String> {
    let mut frames: Vec<(String, Option<String>)> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if let Some(symbol) = frame_symbol(trimmed) {
            frames.push((symbol.to_string(), None));
        } else if let Some(location) = trimmed.strip_prefix("at ") {
            match frames.last_mut() {
                Some((_, loc)) if loc.is_none() => *loc = Some(location.trim().to_string()),
                _ => {}
            }
        }
    }

    let start = frames
        .iter()
        .position(|(s, _)| s.contains("__rust_end_short_backtrace"))
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = frames
        .iter()
        .position(|(s, _)| s.contains("__rust_begin_short_backtrace"))
        .unwrap_or(frames.len());

    frames
        .get(start..end.max(start))
        .unwrap_or_default()
        .iter()
        .map(|(symbol, location)| match location {
            Some(loc) => format!("    at {symbol} ({loc})"),
            None => format!("    at {symbol}"),
        })
        .collect()
}

/// `"12: core::panicking::panic"` -> `Some("core::panicking::panic")`
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, rest) = line.split_once(':')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let symbol = rest.trim();
    (!symbol.is_empty()).then_some(symbol)
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
