// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::CrashPayload;

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for crash payloads.
pub mod strategies {
    use crate::CrashPayload;
    use proptest::prelude::*;

    pub fn arb_frame() -> impl Strategy<Value = String> {
        ("[a-z_]{1,12}(::[a-z_]{1,12}){0,3}", "[a-z/]{1,20}\\.rs", 1u32..5000)
            .prop_map(|(symbol, file, line)| format!("    at {symbol} ({file}:{line}:5)"))
    }

    pub fn arb_payload() -> impl Strategy<Value = CrashPayload> {
        (
            prop_oneof![Just("panic".to_string()), "[a-z_]{1,10}(::[A-Z][a-zA-Z]{1,10}){1,2}"],
            any::<String>(),
            proptest::option::of(any::<String>()),
            proptest::collection::vec(arb_frame(), 0..8),
        )
            .prop_map(|(kind, message, cause, frames)| {
                CrashPayload::new(kind, message, cause, frames.join("\n"))
            })
    }
}

// ── Payload factories ─────────────────────────────────────────────────────

pub fn panic_payload(message: &str) -> CrashPayload {
    CrashPayload::new(
        "panic",
        message,
        None,
        "thread 'main' panicked at src/main.rs:3:5\n    at demo::main (./src/main.rs:3:5)",
    )
}

pub fn error_payload(message: &str, cause: &str) -> CrashPayload {
    CrashPayload::new(
        "demo::ConfigError",
        message,
        Some(cause.to_string()),
        format!("    at demo::load (./src/config.rs:40:9)\nCaused by: {cause}"),
    )
}
