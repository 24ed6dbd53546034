// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for protocol serde roundtrips.
//!
//! Covers every variant of Request and Response with minimal fixed field
//! values, plus arbitrary crash payloads through the Crash request.

use cw_core::test_support::{panic_payload, strategies::arb_payload};
use proptest::prelude::*;

use super::*;

fn s() -> String {
    String::new()
}

fn all_requests() -> Vec<Request> {
    vec![
        Request::Ping,
        Request::Hello { version: s() },
        Request::Bind { pid: 0, version: s() },
        Request::Crash { payload: panic_payload("") },
        Request::Status,
        Request::Shutdown,
    ]
}

fn all_responses() -> Vec<Response> {
    vec![
        Response::Ok,
        Response::Pong,
        Response::Hello { version: s() },
        Response::Bound { supervisor_pid: 0 },
        Response::Status {
            status: SupervisorStatus {
                phase: Phase::Active,
                pid: 0,
                uptime_secs: 0,
                bound_clients: 0,
                presented: 0,
                poll_finished: true,
                stop_requested: false,
            },
        },
        Response::ShuttingDown,
        Response::Error { message: s() },
    ]
}

#[test]
fn every_request_variant_roundtrips() {
    for request in all_requests() {
        let decoded: Request = decode(&encode(&request).unwrap()).unwrap();
        assert_eq!(decoded, request);
    }
}

#[test]
fn every_response_variant_roundtrips() {
    for response in all_responses() {
        let decoded: Response = decode(&encode(&response).unwrap()).unwrap();
        assert_eq!(decoded, response);
    }
}

proptest! {
    #[test]
    fn crash_request_preserves_payload(payload in arb_payload()) {
        let request = Request::Crash { payload };
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &encode(&request).unwrap()).unwrap();

        let data = read_frame(&mut std::io::Cursor::new(buffer)).unwrap();
        let decoded: Request = decode(&data).unwrap();
        prop_assert_eq!(decoded, request);
    }
}
