// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn marker_names_the_pid() {
    let marker = startup_marker(4242);

    assert!(marker.starts_with(STARTUP_MARKER_PREFIX));
    assert_eq!(marker, "--- crashwatchd: starting (pid: 4242) ---");
}

#[test]
fn markers_append_to_the_log() {
    let dir = tempdir().unwrap();
    let state_dir = dir.path().join("state");

    write_startup_marker(&state_dir).unwrap();
    write_startup_marker(&state_dir).unwrap();

    let log = std::fs::read_to_string(state_dir.join(LOG_FILE_NAME)).unwrap();
    let markers = log.lines().filter(|l| l.starts_with(STARTUP_MARKER_PREFIX)).count();
    assert_eq!(markers, 2);
}
