// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! each one in its own task. A connection that opens with `Bind` belongs to
//! a host process and stays open until the host exits; anything else is a
//! one-shot request from the CLI.

use std::sync::Arc;
use std::time::Duration;

use cw_wire::{self as wire, ProtocolError, Request, Response, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::coordinator::{ClientId, CoordinatorEvent, CoordinatorHandle};

/// Shared context for all connection handlers.
pub(crate) struct ListenCtx {
    pub coordinator: CoordinatorHandle,
    pub ipc_timeout: Duration,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("coordinator has stopped")]
    CoordinatorGone,
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Run the accept loop until `cancel` fires, spawning a task per connection.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => {
                        let ctx = Arc::clone(&self.ctx);
                        let cancel = cancel.clone();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            if let Err(e) = handle_connection(reader, writer, &ctx, cancel).await {
                                log_connection_error(e);
                            }
                        });
                    }
                    Err(e) => error!("Unix accept error: {}", e),
                },
                _ = cancel.cancelled() => {
                    debug!("listener stopping");
                    break;
                }
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected")
        }
        ConnectionError::Protocol(ProtocolError::Timeout) => {
            warn!("Connection timeout")
        }
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection.
async fn handle_connection(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    ctx: &ListenCtx,
    cancel: CancellationToken,
) -> Result<(), ConnectionError> {
    let request = wire::read_request(&mut reader, ctx.ipc_timeout).await?;

    if let Request::Bind { pid, version } = request {
        return handle_bound_client(pid, version, reader, writer, ctx, cancel).await;
    }

    if matches!(request, Request::Status | Request::Ping) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }
    let response = handle_request(request, ctx).await?;
    debug!("Sending response: {:?}", response);
    wire::write_response(&mut writer, &response, ctx.ipc_timeout).await?;
    Ok(())
}

/// Handle a single one-shot request and return a response.
async fn handle_request(request: Request, ctx: &ListenCtx) -> Result<Response, ConnectionError> {
    match request {
        Request::Ping => Ok(Response::Pong),

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(
                    client = %version,
                    supervisor = PROTOCOL_VERSION,
                    "protocol version mismatch"
                );
            }
            Ok(Response::Hello { version: PROTOCOL_VERSION.to_string() })
        }

        Request::Status => Ok(Response::Status { status: ctx.coordinator.status() }),

        // An unbound crash report still reaches the coordinator; the sender
        // just never counted as a client.
        Request::Crash { payload } => {
            forward(ctx, CoordinatorEvent::Crash { payload }).await?;
            Ok(Response::Ok)
        }

        Request::Shutdown => {
            forward(ctx, CoordinatorEvent::Shutdown).await?;
            Ok(Response::ShuttingDown)
        }

        Request::Bind { .. } => {
            Ok(Response::Error { message: "Bind must open a connection".to_string() })
        }
    }
}

async fn forward(ctx: &ListenCtx, event: CoordinatorEvent) -> Result<(), ConnectionError> {
    ctx.coordinator.send(event).await.map_err(|_| ConnectionError::CoordinatorGone)
}

/// Serve a bound host until its connection closes, then unbind it.
async fn handle_bound_client(
    pid: u32,
    version: String,
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    ctx: &ListenCtx,
    cancel: CancellationToken,
) -> Result<(), ConnectionError> {
    let client = ClientId::new_v4();
    if ctx.coordinator.send(CoordinatorEvent::ClientBound { client }).await.is_err() {
        let response = Response::Error { message: "supervisor is stopping".to_string() };
        wire::write_response(&mut writer, &response, ctx.ipc_timeout).await?;
        return Ok(());
    }
    info!(%client, host_pid = pid, %version, "host bound");

    let bound = Response::Bound { supervisor_pid: std::process::id() };
    let result = match wire::write_response(&mut writer, &bound, ctx.ipc_timeout).await {
        Ok(()) => serve_bound(client, &mut reader, &mut writer, ctx, cancel).await,
        Err(e) => Err(e.into()),
    };

    // Closing the connection is the unbind, whatever ended it.
    let _ = ctx.coordinator.send(CoordinatorEvent::ClientUnbound { client }).await;
    result
}

async fn serve_bound(
    client: ClientId,
    reader: &mut OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
    ctx: &ListenCtx,
    cancel: CancellationToken,
) -> Result<(), ConnectionError> {
    loop {
        let data = tokio::select! {
            result = wire::read_message(reader) => match result {
                Ok(data) => data,
                Err(ProtocolError::ConnectionClosed) => {
                    debug!(%client, "host connection closed");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
            _ = cancel.cancelled() => return Ok(()),
        };

        let response = match wire::decode::<Request>(&data) {
            Ok(Request::Crash { payload }) => {
                info!(%client, kind = payload.kind(), "crash reported by host");
                forward(ctx, CoordinatorEvent::Crash { payload }).await?;
                Response::Ok
            }
            Ok(Request::Ping) => Response::Pong,
            Ok(other) => {
                warn!(%client, request = ?other, "unsupported request on bound connection");
                Response::Error { message: "unsupported on a bound connection".to_string() }
            }
            Err(e) => {
                warn!(%client, error = %e, "dropping undecodable frame");
                Response::Error { message: format!("invalid request: {e}") }
            }
        };

        // The host may already be gone after a crash report.
        if let Err(e) = wire::write_response(writer, &response, ctx.ipc_timeout).await {
            debug!(%client, error = %e, "could not acknowledge host");
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
