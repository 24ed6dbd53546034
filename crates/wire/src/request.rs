// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cw_core::CrashPayload;
use serde::{Deserialize, Serialize};

/// Request sent to the supervisor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake (CLI queries; does not bind)
    Hello { version: String },

    /// Bind a host process to the supervisor.
    ///
    /// The connection stays open for the host's lifetime; the supervisor
    /// treats it closing as the host unbinding.
    Bind { pid: u32, version: String },

    /// Deliver a crash from a bound host
    Crash { payload: CrashPayload },

    /// Get supervisor status
    Status,

    /// Request supervisor shutdown (honoured once the fallback poll is done)
    Shutdown,
}
