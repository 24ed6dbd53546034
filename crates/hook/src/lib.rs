// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! In-process half of crashwatch.
//!
//! [`install`] replaces the panic hook with one that hands every crash to
//! the supervisor, or to the fallback record when the supervisor cannot be
//! reached, and then runs the previous hook.

mod handler;
mod install;
mod spawn;
mod transport;

pub use handler::{CrashHandler, Delivery};
pub use install::{install, HookOptions, Installed};
pub use spawn::{find_supervisor_binary, spawn_supervisor};
pub use transport::{connect, HookError, SendError, TransportHandle};
