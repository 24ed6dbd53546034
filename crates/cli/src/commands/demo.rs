// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cw demo` - crash on purpose to exercise the whole pipeline

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use cw_hook::{Delivery, HookOptions};
use thiserror::Error;

use crate::exit_error::ExitError;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Report a fatal error instead of panicking
    #[arg(long)]
    pub error: bool,
    /// Crash before the supervisor connection is up (forces the fallback record)
    #[arg(long)]
    pub no_wait: bool,
    /// How long to wait for the supervisor connection, in milliseconds
    #[arg(long, default_value = "5000")]
    pub wait_ms: u64,
}

#[derive(Debug, Error)]
#[error("failed to load demo settings")]
pub struct DemoError {
    #[source]
    source: std::io::Error,
}

#[allow(clippy::panic)]
pub fn demo(args: DemoArgs) -> Result<()> {
    let mut options = HookOptions::from_env()?;
    options.may_start_detached = true;
    if args.no_wait {
        options.grace = Duration::ZERO;
    }
    let installed = cw_hook::install(options);

    if !args.no_wait {
        let connected = installed.wait_connected(Duration::from_millis(args.wait_ms));
        eprintln!("supervisor {}", if connected { "connected" } else { "unreachable" });
    }

    if args.error {
        let error = DemoError {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        let delivery = installed.report(&error);
        return Err(ExitError::new(1, describe(delivery)).into());
    }

    panic!("crashwatch demo panic");
}

fn describe(delivery: Delivery) -> &'static str {
    match delivery {
        Delivery::Delivered => "crash delivered to supervisor",
        Delivery::Persisted => "crash saved to fallback record",
        Delivery::Lost => "crash could not be delivered or saved",
    }
}
