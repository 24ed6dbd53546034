// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! crashwatchd: per-user crash supervisor.

use std::process::ExitCode;

use cw_adapters::{CommandLauncher, DesktopNotifyAdapter};
use cw_daemon::{logging, Config, LifecycleError, Supervisor};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let state_dir = match cw_core::paths::state_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("crashwatchd: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::write_startup_marker(&state_dir) {
        eprintln!("crashwatchd: cannot write log in {}: {e}", state_dir.display());
        return ExitCode::FAILURE;
    }
    let _guard = logging::init(&state_dir);

    let supervisor = match start().await {
        Ok(supervisor) => supervisor,
        Err(e) => {
            error!("Failed to start supervisor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let status = supervisor.run_until_stopped(shutdown_signal()).await;
    info!(presented = status.presented, "supervisor exited");
    ExitCode::SUCCESS
}

async fn start() -> Result<Supervisor, LifecycleError> {
    let config = Config::load()?;
    let launcher = CommandLauncher::new(config.settings.viewer_program());
    let notifier =
        DesktopNotifyAdapter::new(config.settings.notifications.clone(), launcher.clone());
    Supervisor::start(config, notifier, launcher).await
}

/// Resolves on SIGTERM or SIGINT
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let signals = (signal(SignalKind::terminate()), signal(SignalKind::interrupt()));
    let (mut term, mut int) = match signals {
        (Ok(term), Ok(int)) => (term, int),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "cannot install signal handlers");
            return std::future::pending().await;
        }
    };
    tokio::select! {
        _ = term.recv() => {}
        _ = int.recv() => {}
    }
}
