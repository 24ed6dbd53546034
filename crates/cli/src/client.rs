// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response client for the supervisor socket.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cw_core::{paths, PathError};
use cw_wire::{ProtocolError, Request, Response, SupervisorStatus, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::daemon_process::read_startup_error;

const START_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("supervisor not running")]
    NotRunning,
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("supervisor rejected request: {0}")]
    Rejected(String),
    #[error("unexpected response: {0:?}")]
    Unexpected(Box<Response>),
    #[error("failed to start supervisor: {0}")]
    StartFailed(String),
    #[error(transparent)]
    Paths(#[from] PathError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True when nothing is listening on the socket
    pub fn is_not_running(&self) -> bool {
        match self {
            ClientError::NotRunning => true,
            ClientError::Protocol(ProtocolError::ConnectionClosed) => true,
            ClientError::Io(e) => {
                matches!(e.kind(), ErrorKind::NotFound | ErrorKind::ConnectionRefused)
            }
            _ => false,
        }
    }
}

/// One-shot client; every call opens a fresh connection
#[derive(Debug, Clone)]
pub struct SupervisorClient {
    socket_path: PathBuf,
    log_path: PathBuf,
    timeout: Duration,
}

impl SupervisorClient {
    /// Client for the per-user supervisor at the standard locations
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::in_state_dir(&paths::state_dir()?, crate::env::ipc_timeout()))
    }

    pub fn in_state_dir(state_dir: &Path, timeout: Duration) -> Self {
        Self {
            socket_path: paths::socket_path(state_dir),
            log_path: state_dir.join(cw_daemon::logging::LOG_FILE_NAME),
            timeout,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = match UnixStream::connect(&self.socket_path).await {
            Ok(stream) => stream,
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::ConnectionRefused) => {
                return Err(ClientError::NotRunning)
            }
            Err(e) => return Err(e.into()),
        };
        cw_wire::write_request(&mut stream, request, self.timeout).await?;
        match cw_wire::read_response(&mut stream, self.timeout).await? {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            response => Ok(response),
        }
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        Err(ClientError::Unexpected(Box::new(response)))
    }

    /// Supervisor's protocol version
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: PROTOCOL_VERSION.to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<SupervisorStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { status } => Ok(status),
            other => Self::reject(other),
        }
    }

    /// Ask the supervisor to stop; `Ok(false)` when it wasn't running
    pub async fn shutdown(&self) -> Result<bool, ClientError> {
        match self.send(&Request::Shutdown).await {
            Ok(Response::ShuttingDown) => Ok(true),
            Ok(other) => Self::reject(other),
            Err(e) if e.is_not_running() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Return once a supervisor answers, spawning `program` if none does.
    ///
    /// On timeout the supervisor log is searched for the reason the start
    /// failed.
    pub async fn connect_or_start(
        &self,
        program: &Path,
        timeout: Duration,
    ) -> Result<(), ClientError> {
        match self.hello().await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_not_running() => {}
            Err(e) => return Err(e),
        }

        cw_hook::spawn_supervisor(program)
            .map_err(|e| ClientError::StartFailed(format!("{}: {e}", program.display())))?;

        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(START_POLL).await;
            if self.hello().await.is_ok() {
                return Ok(());
            }
        }

        let reason = read_startup_error(&self.log_path)
            .unwrap_or_else(|| format!("no answer within {}ms", timeout.as_millis()));
        Err(ClientError::StartFailed(reason))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
