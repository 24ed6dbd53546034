// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide wiring: panic hook plus the background connect thread.

use std::backtrace::Backtrace;
use std::cell::Cell;
use std::error::Error;
use std::io::IsTerminal;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cw_core::paths;
use cw_storage::FallbackStore;
use tracing::{debug, info, warn};

use crate::handler::{CrashHandler, Delivery};
use crate::spawn::{find_supervisor_binary, spawn_supervisor};
use crate::transport::{connect, HookError, TransportHandle};

const CONNECT_RETRY: Duration = Duration::from_millis(100);

thread_local! {
    /// Set while this thread is inside [`Installed::report`]
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as reporting until dropped
struct ReportingGuard;

impl ReportingGuard {
    fn enter() -> Self {
        REPORTING.with(|r| r.set(true));
        ReportingGuard
    }
}

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTING.with(|r| r.set(false));
    }
}

fn is_reporting() -> bool {
    REPORTING.with(Cell::get)
}

/// How [`install`] finds, starts and waits for the supervisor
#[derive(Debug, Clone)]
pub struct HookOptions {
    pub socket_path: PathBuf,
    /// Directory holding the fallback record
    pub cache_dir: PathBuf,
    /// Whether this process may launch the supervisor itself
    pub may_start_detached: bool,
    pub supervisor_program: PathBuf,
    /// How long a crash waits for a pending connection before persisting
    pub grace: Duration,
    /// How long the connect thread keeps trying
    pub connect_window: Duration,
    /// Read/write timeout on the supervisor connection
    pub io_timeout: Duration,
}

impl HookOptions {
    /// Options for the per-user supervisor at the standard locations
    pub fn from_env() -> Result<Self, HookError> {
        Ok(Self::new(paths::socket_path(&paths::state_dir()?), paths::cache_dir()?))
    }

    pub fn new(socket_path: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            socket_path,
            cache_dir,
            // Only foreground hosts start the supervisor themselves.
            may_start_detached: std::io::stderr().is_terminal(),
            supervisor_program: find_supervisor_binary(),
            grace: Duration::from_secs(1),
            connect_window: Duration::from_secs(10),
            io_timeout: Duration::from_secs(2),
        }
    }
}

/// Handle returned by [`install`]
#[derive(Debug, Clone)]
pub struct Installed {
    handler: Arc<CrashHandler>,
}

impl Installed {
    /// Report a fatal error that will not surface as a panic.
    ///
    /// A panic raised by the error's `Display` is not reported as a second
    /// crash: the message becomes `<unprintable>` and the panic only reaches
    /// the previous hook. Under `panic = "abort"` that panic still aborts
    /// the process before anything is sent.
    pub fn report<E: Error + 'static>(&self, error: &E) -> Delivery {
        let payload = {
            let _guard = ReportingGuard::enter();
            cw_core::process_error(error, &Backtrace::force_capture())
        };
        self.handler.handle(&payload)
    }

    /// Like [`Installed::report`], for boxed or type-erased errors
    pub fn report_dyn(&self, kind: &str, error: &(dyn Error + 'static)) -> Delivery {
        let payload = {
            let _guard = ReportingGuard::enter();
            cw_core::process_dyn_error(kind, error, &Backtrace::force_capture())
        };
        self.handler.handle(&payload)
    }

    pub fn is_connected(&self) -> bool {
        self.handler.transport().is_connected()
    }

    /// Block until connected or `timeout` passes
    pub fn wait_connected(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.handler.transport().is_pending() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        self.is_connected()
    }
}

/// Install the crash hook and start connecting to the supervisor.
///
/// The previous panic hook is chained and always runs after the crash has
/// been sent or persisted. Call once per process.
pub fn install(options: HookOptions) -> Installed {
    let transport = Arc::new(TransportHandle::new());
    let store = FallbackStore::in_dir(&options.cache_dir);
    let handler = Arc::new(CrashHandler::new(Arc::clone(&transport), store, options.grace));

    let previous = panic::take_hook();
    let hook_handler = Arc::clone(&handler);
    panic::set_hook(Box::new(move |info| {
        if is_reporting() {
            previous(info);
            return;
        }
        let payload = cw_core::process_panic(info, &Backtrace::force_capture());
        let delivery = hook_handler.handle(&payload);
        debug!(?delivery, "panic reported");
        previous(info);
    }));

    spawn_connector(options, transport);
    Installed { handler }
}

fn spawn_connector(options: HookOptions, transport: Arc<TransportHandle>) {
    let thread_transport = Arc::clone(&transport);
    let spawned = std::thread::Builder::new()
        .name("crashwatch-connect".to_string())
        .spawn(move || connect_loop(&options, &thread_transport));
    if let Err(e) = spawned {
        warn!(error = %e, "cannot start supervisor connect thread");
        transport.abandon();
    }
}

fn connect_loop(options: &HookOptions, transport: &TransportHandle) {
    let deadline = Instant::now() + options.connect_window;
    let mut started = false;
    loop {
        match connect(&options.socket_path, options.io_timeout) {
            Ok(stream) => {
                transport.set(stream);
                info!(socket = %options.socket_path.display(), "connected to supervisor");
                return;
            }
            Err(e) => debug!(error = %e, "supervisor not reachable"),
        }

        if !started && options.may_start_detached {
            started = true;
            if let Err(e) = spawn_supervisor(&options.supervisor_program) {
                warn!(
                    program = %options.supervisor_program.display(),
                    error = %e,
                    "cannot start supervisor"
                );
            }
        }

        if Instant::now() >= deadline {
            debug!("giving up on supervisor connection");
            transport.abandon();
            return;
        }
        std::thread::sleep(CONNECT_RETRY);
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
