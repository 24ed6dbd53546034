// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hands crashes to the user-facing surfaces.

use cw_adapters::{
    CrashNotification, Importance, NotifyAdapter, ViewerLauncher, CRASH_CHANNEL,
};
use cw_core::CrashPayload;
use tracing::warn;

/// Which surface shows a crash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Open the viewer immediately (the host reported the crash live)
    DirectLaunch,
    /// Post a notification that opens the viewer when activated
    Notification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    NotificationsDisabled,
    ChannelDisabled,
}

/// What happened to a crash handed to the presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Launched,
    Notified,
    Suppressed(SuppressReason),
    Failed(String),
}

pub struct Presenter<N, L> {
    notifier: N,
    launcher: L,
}

impl<N: NotifyAdapter, L: ViewerLauncher> Presenter<N, L> {
    pub fn new(notifier: N, launcher: L) -> Self {
        Self { notifier, launcher }
    }

    pub async fn present(&self, payload: &CrashPayload, route: Route) -> Presentation {
        match route {
            Route::DirectLaunch => match self.launcher.launch(payload) {
                Ok(()) => Presentation::Launched,
                Err(e) => {
                    warn!(error = %e, "failed to launch crash viewer");
                    Presentation::Failed(e.to_string())
                }
            },
            Route::Notification => self.notify(payload).await,
        }
    }

    async fn notify(&self, payload: &CrashPayload) -> Presentation {
        if !self.notifier.notifications_enabled() {
            warn!("Cannot post crash notification: notifications are disabled");
            return Presentation::Suppressed(SuppressReason::NotificationsDisabled);
        }
        if self.notifier.ensure_channel(&CRASH_CHANNEL) == Importance::None {
            warn!(
                channel = CRASH_CHANNEL.name,
                "Cannot post crash notification: notification channel is disabled"
            );
            return Presentation::Suppressed(SuppressReason::ChannelDisabled);
        }
        let notification = CrashNotification::new(&CRASH_CHANNEL, payload.clone());
        match self.notifier.notify(notification).await {
            Ok(()) => Presentation::Notified,
            Err(e) => {
                warn!(error = %e, "failed to post crash notification");
                Presentation::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "presenter_tests.rs"]
mod tests;
