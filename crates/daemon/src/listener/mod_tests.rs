// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use cw_adapters::{FakeLauncher, FakeNotifyAdapter};
use cw_core::test_support::panic_payload;
use cw_storage::FallbackStore;
use cw_wire::Phase;
use tempfile::{tempdir, TempDir};
use tokio::net::UnixStream;

use super::*;
use crate::coordinator::{Coordinator, PollPolicy, Presenter};

const TIMEOUT: Duration = Duration::from_secs(5);

struct TestListener {
    socket: PathBuf,
    handle: CoordinatorHandle,
    launcher: FakeLauncher,
    cancel: CancellationToken,
    _dir: TempDir,
}

fn spawn_listener() -> TestListener {
    let dir = tempdir().unwrap();
    let socket = dir.path().join("supervisor.sock");
    let unix = UnixListener::bind(&socket).unwrap();
    let launcher = FakeLauncher::new();
    let (coordinator, handle) = Coordinator::new(
        FallbackStore::in_dir(dir.path()),
        Presenter::new(FakeNotifyAdapter::new(), launcher.clone()),
        PollPolicy { interval: Duration::from_millis(10), attempts: 1 },
    );
    tokio::spawn(coordinator.run());
    let cancel = CancellationToken::new();
    let ctx = Arc::new(ListenCtx { coordinator: handle.clone(), ipc_timeout: TIMEOUT });
    tokio::spawn(Listener::new(unix, ctx).run(cancel.clone()));
    TestListener { socket, handle, launcher, cancel, _dir: dir }
}

async fn roundtrip(stream: &mut UnixStream, request: &Request) -> Response {
    wire::write_request(stream, request, TIMEOUT).await.unwrap();
    wire::read_response(stream, TIMEOUT).await.unwrap()
}

async fn one_shot(socket: &PathBuf, request: Request) -> Response {
    let mut stream = UnixStream::connect(socket).await.unwrap();
    roundtrip(&mut stream, &request).await
}

async fn bind(socket: &PathBuf) -> UnixStream {
    let mut stream = UnixStream::connect(socket).await.unwrap();
    let response = roundtrip(
        &mut stream,
        &Request::Bind { pid: 4242, version: PROTOCOL_VERSION.to_string() },
    )
    .await;
    assert_eq!(response, Response::Bound { supervisor_pid: std::process::id() });
    stream
}

#[tokio::test]
async fn ping_and_hello() {
    let t = spawn_listener();

    assert_eq!(one_shot(&t.socket, Request::Ping).await, Response::Pong);
    assert_eq!(
        one_shot(&t.socket, Request::Hello { version: "0.0.0".to_string() }).await,
        Response::Hello { version: PROTOCOL_VERSION.to_string() }
    );
}

#[tokio::test]
async fn queries_do_not_count_as_clients() {
    let t = spawn_listener();
    t.handle.wait_for(|s| s.poll_finished).await.unwrap();

    let response = one_shot(&t.socket, Request::Status).await;

    let Response::Status { status } = &response else {
        panic!("expected status, got {response:?}")
    };
    assert_eq!(status.phase, Phase::Active);
    assert_eq!(status.bound_clients, 0);
}

#[tokio::test]
async fn bound_connection_counts_until_closed() {
    let t = spawn_listener();
    let stream = bind(&t.socket).await;

    let status = t.handle.wait_for(|s| s.bound_clients == 1 && s.poll_finished).await.unwrap();
    assert_eq!(status.phase, Phase::Active);

    drop(stream);
    let status = t.handle.wait_for(|s| s.phase == Phase::Stopped).await.unwrap();
    assert_eq!(status.bound_clients, 0);
}

#[tokio::test]
async fn crash_on_bound_connection_reaches_viewer() {
    let t = spawn_listener();
    let mut stream = bind(&t.socket).await;

    let response =
        roundtrip(&mut stream, &Request::Crash { payload: panic_payload("boom") }).await;

    assert_eq!(response, Response::Ok);
    t.handle.wait_for(|s| s.presented == 1).await.unwrap();
    assert_eq!(t.launcher.launched(), vec![panic_payload("boom")]);
}

#[tokio::test]
async fn undecodable_frame_keeps_bound_connection_open() {
    let t = spawn_listener();
    let mut stream = bind(&t.socket).await;

    wire::write_message(&mut stream, b"{not json").await.unwrap();
    let response = wire::read_response(&mut stream, TIMEOUT).await.unwrap();
    assert!(matches!(response, Response::Error { .. }), "got {response:?}");

    assert_eq!(roundtrip(&mut stream, &Request::Ping).await, Response::Pong);
    assert_eq!(t.handle.status().bound_clients, 1);
}

#[tokio::test]
async fn unbound_crash_report_is_forwarded() {
    let t = spawn_listener();

    let response = one_shot(&t.socket, Request::Crash { payload: panic_payload("boom") }).await;

    assert_eq!(response, Response::Ok);
    t.handle.wait_for(|s| s.presented == 1).await.unwrap();
}

#[tokio::test]
async fn shutdown_request_stops_coordinator() {
    let t = spawn_listener();

    assert_eq!(one_shot(&t.socket, Request::Shutdown).await, Response::ShuttingDown);

    t.handle.stopped().await;
    assert_eq!(t.handle.phase(), Phase::Stopped);
}

#[tokio::test]
async fn cancel_closes_bound_connections() {
    let t = spawn_listener();
    let mut stream = bind(&t.socket).await;

    t.cancel.cancel();

    let err = wire::read_message(&mut stream).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed), "got {err:?}");
}
