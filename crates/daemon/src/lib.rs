// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! crashwatch supervisor library.
//!
//! The `crashwatchd` binary is a thin shell around [`Supervisor`]; tests
//! drive the same code with fake adapters.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod coordinator;
pub mod env;
pub mod lifecycle;
pub mod logging;
pub mod settings;
mod listener;
mod supervisor;

pub use coordinator::{
    ClientId, Coordinator, CoordinatorEvent, CoordinatorHandle, PollPolicy, Presentation,
    Presenter, Route, SuppressReason,
};
pub use lifecycle::{Config, LifecycleError};
pub use settings::Settings;
pub use supervisor::Supervisor;
