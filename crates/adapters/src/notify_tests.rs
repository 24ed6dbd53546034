// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::launch::FakeLauncher;
use cw_core::test_support::panic_payload;

#[test]
fn crash_channel_is_high_importance() {
    assert_eq!(CRASH_CHANNEL.id, "CHANNEL_CRASHES");
    assert_eq!(CRASH_CHANNEL.name, "Crashes");
    assert_eq!(CRASH_CHANNEL.importance, Importance::High);
}

#[test]
fn crash_notification_text() {
    let n = CrashNotification::new(&CRASH_CHANNEL, panic_payload("boom"));

    assert_eq!(n.channel_id, "CHANNEL_CRASHES");
    assert_eq!(n.title, "App crashed");
    assert_eq!(n.body, "Tap to see more info");
    assert_eq!(n.payload.message(), "boom");
}

#[yare::parameterized(
    no_override    = { None,                   Importance::High },
    disabled       = { Some(Importance::None), Importance::None },
    lowered        = { Some(Importance::Low),  Importance::Low },
)]
fn settings_importance_applies_overrides(over: Option<Importance>, expected: Importance) {
    let mut settings = NotifySettings::default();
    if let Some(importance) = over {
        settings.channels.insert(CRASH_CHANNEL.id.to_string(), importance);
    }

    assert_eq!(settings.importance(&CRASH_CHANNEL), expected);
}

#[test]
fn settings_parse_from_toml() {
    let settings: NotifySettings = toml::from_str(
        r#"
enabled = false
[channels]
CHANNEL_CRASHES = "none"
"#,
    )
    .unwrap();

    assert!(!settings.enabled);
    assert_eq!(settings.importance(&CRASH_CHANNEL), Importance::None);
}

#[test]
fn settings_default_when_empty() {
    let settings: NotifySettings = toml::from_str("").unwrap();

    assert_eq!(settings, NotifySettings::default());
    assert!(settings.enabled);
}

#[test]
fn desktop_adapter_reads_settings() {
    let mut settings = NotifySettings::default();
    settings.enabled = false;
    settings.channels.insert(CRASH_CHANNEL.id.to_string(), Importance::Low);

    let adapter = DesktopNotifyAdapter::new(settings, FakeLauncher::new());

    assert!(!adapter.notifications_enabled());
    assert_eq!(adapter.ensure_channel(&CRASH_CHANNEL), Importance::Low);
}

#[tokio::test]
async fn fake_adapter_records_channels_and_calls() {
    let adapter = FakeNotifyAdapter::new();

    assert_eq!(adapter.ensure_channel(&CRASH_CHANNEL), Importance::High);
    assert_eq!(adapter.ensure_channel(&CRASH_CHANNEL), Importance::High);
    adapter.notify(CrashNotification::new(&CRASH_CHANNEL, panic_payload("boom"))).await.unwrap();

    assert_eq!(adapter.channels(), vec!["CHANNEL_CRASHES".to_string()]);
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn fake_adapter_failure_is_returned() {
    let adapter = FakeNotifyAdapter::new();
    adapter.fail_with("no notification server");

    let notification = CrashNotification::new(&CRASH_CHANNEL, panic_payload("boom"));
    let result = adapter.notify(notification).await;

    let Err(NotifyError::SendFailed(reason)) = &result else {
        panic!("expected failure, got {result:?}")
    };
    assert_eq!(reason, "no notification server");
    assert!(adapter.calls().is_empty());
}
