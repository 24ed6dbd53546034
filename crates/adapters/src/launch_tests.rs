// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cw_core::test_support::{error_payload, panic_payload};

#[test]
fn args_carry_every_field() {
    let args = CommandLauncher::args(&error_payload("failed to load", "permission denied"));

    assert_eq!(
        args,
        vec![
            "show",
            "--open",
            "--type",
            "demo::ConfigError",
            "--message",
            "failed to load",
            "--cause",
            "permission denied",
            "--stack-trace",
            "    at demo::load (./src/config.rs:40:9)\nCaused by: permission denied",
        ]
    );
}

#[test]
fn args_omit_absent_cause() {
    let args = CommandLauncher::args(&panic_payload("boom"));

    assert!(!args.iter().any(|a| a == "--cause"));
}

#[test]
fn launch_reports_missing_program() {
    let launcher = CommandLauncher::new("/nonexistent/crashwatch-viewer");

    let err = launcher.launch(&panic_payload("boom")).unwrap_err();

    assert!(err.to_string().contains("/nonexistent/crashwatch-viewer"), "got {err}");
}

#[test]
fn launch_spawns_program() {
    let launcher = CommandLauncher::new("true");

    assert!(launcher.launch(&panic_payload("boom")).is_ok());
}

#[test]
fn fake_launcher_records_payloads() {
    let launcher = FakeLauncher::new();

    launcher.launch(&panic_payload("one")).unwrap();
    launcher.launch(&panic_payload("two")).unwrap();

    let messages: Vec<String> =
        launcher.launched().iter().map(|p| p.message().to_string()).collect();
    assert_eq!(messages, vec!["one", "two"]);
}
