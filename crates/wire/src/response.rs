// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

use super::SupervisorStatus;

/// Response from the supervisor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Bind accepted
    Bound { supervisor_pid: u32 },

    /// Supervisor status
    Status { status: SupervisorStatus },

    /// Shutdown accepted
    ShuttingDown,

    /// Error response
    Error { message: String },
}
