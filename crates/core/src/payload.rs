// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The crash payload handed from a crashing host to the supervisor.

use serde::{Deserialize, Serialize};

/// Structured description of a single crash.
///
/// Built once by the exception processor and never mutated afterwards; the
/// supervisor hands it to exactly one presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashPayload {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<String>,
    stack_trace: String,
}

impl CrashPayload {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        cause: Option<String>,
        stack_trace: impl Into<String>,
    ) -> Self {
        Self { kind: kind.into(), message: message.into(), cause, stack_trace: stack_trace.into() }
    }

    /// Failure type (`"panic"` or the Rust type name of a reported error)
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Display of the immediate error source, when there was one
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    /// Formatted multi-frame trace, one frame per line
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    /// One-line summary used in logs and notification bodies
    pub fn headline(&self) -> String {
        if self.message.is_empty() {
            self.kind.clone()
        } else {
            format!("{}: {}", self.kind, self.message)
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
