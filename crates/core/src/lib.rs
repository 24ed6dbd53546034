// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw-core: crash payload model and exception processing for crashwatch

pub mod paths;
pub mod payload;
pub mod processor;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use paths::PathError;
pub use payload::CrashPayload;
pub use processor::{process_dyn_error, process_error, process_panic, PANIC_KIND};
