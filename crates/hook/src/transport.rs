// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crashing-side end of the transport channel.
//!
//! Everything here is blocking: it runs on the panicking thread, where no
//! async runtime can be relied on.

use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use cw_core::CrashPayload;
use cw_wire::{self as wire, ProtocolError, Request, Response, PROTOCOL_VERSION};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors from sending a crash
#[derive(Debug, Error)]
pub enum SendError {
    /// No live connection, or the supervisor went away
    #[error("not connected to supervisor")]
    NotConnected,

    #[error("cannot encode crash: {0}")]
    Encode(#[from] ProtocolError),
}

/// Errors from connecting to or starting the supervisor
#[derive(Debug, Error)]
pub enum HookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("supervisor refused bind: {0}")]
    Rejected(String),

    #[error("could not determine directory: {0}")]
    Paths(#[from] cw_core::PathError),
}

/// Slot for the bound supervisor connection.
///
/// Set at most once by the connect thread; read by whichever thread
/// crashes. `send` never blocks longer than the lock wait plus the
/// socket's write timeout.
#[derive(Debug, Default)]
pub struct TransportHandle {
    conn: OnceLock<Mutex<UnixStream>>,
    abandoned: AtomicBool,
}

const LOCK_WAIT: Duration = Duration::from_millis(250);

impl TransportHandle {
    pub const fn new() -> Self {
        Self { conn: OnceLock::new(), abandoned: AtomicBool::new(false) }
    }

    /// Store the connection; returns false if one was already set
    pub fn set(&self, stream: UnixStream) -> bool {
        self.conn.set(Mutex::new(stream)).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Mark that no connection will ever be set
    pub fn abandon(&self) {
        self.abandoned.store(true, Ordering::Release);
    }

    /// Whether a connection may still arrive
    pub fn is_pending(&self) -> bool {
        !self.is_connected() && !self.abandoned.load(Ordering::Acquire)
    }

    /// Write one crash frame to the supervisor.
    ///
    /// Does not wait for an acknowledgement: once the frame is in the
    /// socket buffer it outlives this process.
    pub fn send(&self, payload: &CrashPayload) -> Result<(), SendError> {
        let conn = self.conn.get().ok_or(SendError::NotConnected)?;
        let data = wire::encode(&Request::Crash { payload: payload.clone() })?;
        let mut stream = conn.try_lock_for(LOCK_WAIT).ok_or(SendError::NotConnected)?;
        wire::write_frame(&mut *stream, &data).map_err(|e| {
            debug!(error = %e, "crash frame not written");
            SendError::NotConnected
        })
    }
}

/// Connect to the supervisor socket and bind this process.
///
/// `timeout` bounds every read and write on the returned stream.
pub fn connect(socket: &Path, timeout: Duration) -> Result<UnixStream, HookError> {
    let mut stream = UnixStream::connect(socket)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let bind = Request::Bind { pid: std::process::id(), version: PROTOCOL_VERSION.to_string() };
    wire::write_frame(&mut stream, &wire::encode(&bind)?)?;
    match wire::decode::<Response>(&wire::read_frame(&mut stream)?)? {
        Response::Bound { supervisor_pid } => {
            debug!(supervisor_pid, "bound to supervisor");
            Ok(stream)
        }
        Response::Error { message } => Err(HookError::Rejected(message)),
        other => Err(HookError::Rejected(format!("unexpected response: {other:?}"))),
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
