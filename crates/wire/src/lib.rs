// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between crashing hosts, the supervisor and the CLI.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod request;
mod response;
mod status;
mod wire;

pub use request::Request;
pub use response::Response;
pub use status::{Phase, SupervisorStatus};
pub use wire::{decode, encode, read_frame, read_message, write_frame, write_message};
pub use wire::{read_request, read_response, write_request, write_response};
pub use wire::{ProtocolError, MAX_MESSAGE_SIZE};

/// Protocol version exchanged in `Hello` and `Bind`
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod property_tests;
