// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cw_core::CrashPayload;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::launch::ViewerLauncher;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// How intrusive a channel's notifications are; `None` means disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    None,
    Low,
    Default,
    High,
}

/// A named bucket of notifications the user can silence independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: &'static str,
    pub name: &'static str,
    pub importance: Importance,
}

/// The one channel crash notifications are posted on
pub const CRASH_CHANNEL: NotificationChannel =
    NotificationChannel { id: "CHANNEL_CRASHES", name: "Crashes", importance: Importance::High };

/// A crash notification; activating it opens the crash display
#[derive(Debug, Clone, PartialEq)]
pub struct CrashNotification {
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub payload: CrashPayload,
}

impl CrashNotification {
    pub fn new(channel: &NotificationChannel, payload: CrashPayload) -> Self {
        Self {
            channel_id: channel.id.to_string(),
            title: "App crashed".to_string(),
            body: "Tap to see more info".to_string(),
            payload,
        }
    }
}

/// User-controlled notification preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Master switch for every notification this app posts
    pub enabled: bool,
    /// Per-channel importance overrides, keyed by channel id
    pub channels: HashMap<String, Importance>,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self { enabled: true, channels: HashMap::new() }
    }
}

impl NotifySettings {
    /// Effective importance of `channel` after user overrides
    pub fn importance(&self, channel: &NotificationChannel) -> Importance {
        self.channels.get(channel.id).copied().unwrap_or(channel.importance)
    }
}

/// Adapter for posting crash notifications
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Whether notifications are allowed at all
    fn notifications_enabled(&self) -> bool;

    /// Register `channel` (idempotent) and return its effective importance
    fn ensure_channel(&self, channel: &NotificationChannel) -> Importance;

    /// Post a notification
    async fn notify(&self, notification: CrashNotification) -> Result<(), NotifyError>;
}

/// Desktop notification adapter using notify-rust.
///
/// On macOS, `notify-rust` uses `mac-notification-sys` (Cocoa bindings) to send
/// notifications via the Notification Center. The first notification triggers
/// `ensure_application_set()` which runs an AppleScript to look up a bundle
/// identifier. In a daemon context without Automation permissions, that
/// AppleScript blocks forever. We pre-set the bundle identifier at construction
/// time to bypass the lookup entirely.
///
/// Activation (the default action) launches the crash viewer; this is only
/// wired up on freedesktop platforms, where notify-rust reports actions.
#[derive(Clone, Debug)]
pub struct DesktopNotifyAdapter<L> {
    settings: Arc<NotifySettings>,
    launcher: L,
}

impl<L: ViewerLauncher> DesktopNotifyAdapter<L> {
    pub fn new(settings: NotifySettings, launcher: L) -> Self {
        #[cfg(target_os = "macos")]
        {
            // Pre-set the application bundle identifier so mac-notification-sys
            // skips its NSAppleScript lookup (which blocks forever in daemon
            // processes that lack Automation permissions).
            let _ = mac_notification_sys::set_application("com.apple.Terminal");
        }
        Self { settings: Arc::new(settings), launcher }
    }
}

#[async_trait]
impl<L: ViewerLauncher> NotifyAdapter for DesktopNotifyAdapter<L> {
    fn notifications_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn ensure_channel(&self, channel: &NotificationChannel) -> Importance {
        // Desktop notification servers have no channel registry; the
        // settings file is the registry.
        self.settings.importance(channel)
    }

    async fn notify(&self, notification: CrashNotification) -> Result<(), NotifyError> {
        let launcher = self.launcher.clone();
        let (shown_tx, shown_rx) = tokio::sync::oneshot::channel();
        // notify_rust::Notification::show() is synchronous, and waiting for the
        // default action blocks until the notification is closed. Run both on
        // tokio's bounded blocking thread pool; only the show result is awaited.
        tokio::task::spawn_blocking(move || {
            let CrashNotification { channel_id, title, body, payload } = notification;
            tracing::info!(%title, channel = %channel_id, "sending desktop notification");

            let mut desktop = notify_rust::Notification::new();
            desktop.appname("crashwatch").summary(&title).body(&body);
            #[cfg(all(unix, not(target_os = "macos")))]
            desktop.action("default", "Show details").urgency(notify_rust::Urgency::Critical);

            let handle = match desktop.show() {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = shown_tx.send(Err(NotifyError::SendFailed(e.to_string())));
                    return;
                }
            };
            tracing::info!(%title, "desktop notification sent");
            let _ = shown_tx.send(Ok(()));

            #[cfg(all(unix, not(target_os = "macos")))]
            handle.wait_for_action(|action| {
                if action == "default" {
                    if let Err(e) = launcher.launch(&payload) {
                        tracing::warn!(error = %e, "failed to open crash viewer");
                    }
                }
            });
            #[cfg(target_os = "macos")]
            {
                let _ = (handle, launcher, payload);
            }
        });

        shown_rx.await.unwrap_or_else(|_| {
            Err(NotifyError::SendFailed("notification task ended before showing".to_string()))
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{
        CrashNotification, Importance, NotificationChannel, NotifyAdapter, NotifyError,
        NotifySettings,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FakeNotifyState {
        settings: NotifySettings,
        channels: Vec<String>,
        calls: Vec<CrashNotification>,
        failure: Option<String>,
    }

    /// Fake notification adapter for testing
    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self::with_settings(NotifySettings::default())
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_settings(settings: NotifySettings) -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeNotifyState {
                    settings,
                    channels: Vec::new(),
                    calls: Vec::new(),
                    failure: None,
                })),
            }
        }

        /// Get all recorded notifications
        pub fn calls(&self) -> Vec<CrashNotification> {
            self.inner.lock().calls.clone()
        }

        /// Make every later `notify` fail with `reason`
        pub fn fail_with(&self, reason: &str) {
            self.inner.lock().failure = Some(reason.to_string());
        }

        /// Ids of channels registered so far
        pub fn channels(&self) -> Vec<String> {
            self.inner.lock().channels.clone()
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        fn notifications_enabled(&self) -> bool {
            self.inner.lock().settings.enabled
        }

        fn ensure_channel(&self, channel: &NotificationChannel) -> Importance {
            let mut inner = self.inner.lock();
            if !inner.channels.iter().any(|c| c == channel.id) {
                inner.channels.push(channel.id.to_string());
            }
            inner.settings.importance(channel)
        }

        async fn notify(&self, notification: CrashNotification) -> Result<(), NotifyError> {
            let mut inner = self.inner.lock();
            if let Some(reason) = &inner.failure {
                return Err(NotifyError::SendFailed(reason.clone()));
            }
            inner.calls.push(notification);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
