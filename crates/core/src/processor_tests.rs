// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use super::*;

const RAW_BACKTRACE: &str = "   0: std::panicking::begin_panic_handler
             at /rustc/abc/library/std/src/panicking.rs:665:5
   1: std::sys::backtrace::__rust_end_short_backtrace
             at /rustc/abc/library/std/src/sys/backtrace.rs:168:18
   2: demo::parse
             at ./src/parse.rs:12:9
   3: demo::main
             at ./src/main.rs:4:5
   4: std::sys::backtrace::__rust_begin_short_backtrace
             at /rustc/abc/library/std/src/sys/backtrace.rs:152:18
   5: main
   6: __libc_start_main
";

#[test]
fn format_frames_keeps_only_user_frames() {
    let frames = format_frames(RAW_BACKTRACE);

    assert_eq!(
        frames,
        vec![
            "    at demo::parse (./src/parse.rs:12:9)".to_string(),
            "    at demo::main (./src/main.rs:4:5)".to_string(),
        ]
    );
}

#[test]
fn format_frames_without_markers_keeps_everything() {
    let raw = "   0: foo\n   1: bar\n             at src/bar.rs:1:1\n";
    let frames = format_frames(raw);

    assert_eq!(frames, vec!["    at foo".to_string(), "    at bar (src/bar.rs:1:1)".to_string()]);
}

#[yare::parameterized(
    empty         = { "" },
    disabled      = { "disabled backtrace" },
    unsupported   = { "unsupported backtrace" },
)]
fn format_frames_of_non_captures_is_empty(raw: &str) {
    assert!(format_frames(raw).is_empty());
}

#[test]
fn panic_payload_records_location_and_frames() {
    let payload = build_panic_payload(
        "index out of bounds",
        Some("src/parse.rs:12:9"),
        Some("main"),
        RAW_BACKTRACE,
    );

    assert_eq!(payload.kind(), PANIC_KIND);
    assert_eq!(payload.message(), "index out of bounds");
    assert_eq!(payload.cause(), None);

    let lines: Vec<&str> = payload.stack_trace().lines().collect();
    assert_eq!(lines[0], "thread 'main' panicked at src/parse.rs:12:9");
    assert_eq!(lines[1], "    at demo::parse (./src/parse.rs:12:9)");
    assert_eq!(lines.len(), 3);
}

#[test]
fn panic_payload_without_backtrace_is_still_multiline() {
    let payload = build_panic_payload("boom", None, None, "");

    assert_eq!(payload.stack_trace(), "thread '<unnamed>' panicked\n    (no backtrace captured)");
}

#[test]
fn panic_message_downcasts_str_and_string() {
    let static_str: Box<dyn Any + Send> = Box::new("static");
    let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
    let other: Box<dyn Any + Send> = Box::new(42_u32);

    assert_eq!(panic_message(static_str.as_ref()), "static");
    assert_eq!(panic_message(owned.as_ref()), "owned");
    assert_eq!(panic_message(other.as_ref()), "Box<dyn Any>");
}

#[derive(Debug)]
struct Outer(Inner);

#[derive(Debug)]
struct Inner;

impl fmt::Display for Outer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load settings")
    }
}

impl Error for Outer {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl fmt::Display for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "permission denied")
    }
}

impl Error for Inner {}

#[test]
fn error_payload_carries_type_cause_and_chain() {
    let payload = process_error(&Outer(Inner), &Backtrace::disabled());

    assert!(payload.kind().ends_with("Outer"), "kind was {}", payload.kind());
    assert_eq!(payload.message(), "failed to load settings");
    assert_eq!(payload.cause(), Some("permission denied"));
    assert!(payload.stack_trace().ends_with("Caused by: permission denied"));
}

#[derive(Debug)]
struct Unprintable;

impl fmt::Display for Unprintable {
    #[allow(clippy::panic)]
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("display exploded")
    }
}

impl Error for Unprintable {}

#[test]
fn error_payload_survives_panicking_display() {
    let payload = process_error(&Unprintable, &Backtrace::disabled());

    assert_eq!(payload.message(), "<unprintable>");
    assert_eq!(payload.cause(), None);
    assert_eq!(payload.stack_trace(), "    (no backtrace captured)");
}

#[test]
fn oversized_fields_are_cut_to_fit_one_frame() {
    let huge = "\u{0}".repeat(5 * 1024 * 1024);
    let raw: String = (0..200_000).map(|i| format!("   {i}: demo::frame_{i}\n")).collect();

    let payload = build_panic_payload(&huge, Some("src/lib.rs:1:1"), Some("main"), &raw);

    assert!(payload.message().ends_with(" [truncated]"));
    assert!(payload.message().len() <= MAX_TEXT_BYTES + " [truncated]".len());
    assert!(payload.stack_trace().len() <= MAX_STACK_TRACE_BYTES + " [truncated]".len());
    let encoded = serde_json::to_vec(&payload).unwrap();
    assert!(encoded.len() < 4 * 1024 * 1024, "encoded payload is {} bytes", encoded.len());
}

#[test]
fn oversized_error_message_is_cut() {
    #[derive(Debug)]
    struct Verbose;
    impl fmt::Display for Verbose {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&"x".repeat(MAX_TEXT_BYTES * 3))
        }
    }
    impl Error for Verbose {}

    let payload = process_error(&Verbose, &Backtrace::disabled());

    assert_eq!(payload.message().len(), MAX_TEXT_BYTES + " [truncated]".len());
}

#[yare::parameterized(
    short      = { "hello", 10, "hello" },
    exact      = { "hello", 5, "hello" },
    ascii      = { "hello world", 5, "hello [truncated]" },
    multibyte  = { "héllo", 2, "h [truncated]" },
)]
fn truncate_respects_char_boundaries(text: &str, max: usize, expected: &str) {
    assert_eq!(truncate(text.to_string(), max), expected);
}
