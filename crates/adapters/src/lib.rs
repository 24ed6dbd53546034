// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Presentation adapters: desktop notifications and the crash viewer.

pub mod launch;
pub mod notify;

pub use launch::{CommandLauncher, LaunchError, ViewerLauncher};
pub use notify::{
    CrashNotification, DesktopNotifyAdapter, Importance, NotificationChannel, NotifyAdapter,
    NotifyError, NotifySettings, CRASH_CHANNEL,
};

#[cfg(any(test, feature = "test-support"))]
pub use launch::FakeLauncher;
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
