// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw: crashwatch command line

mod client;
mod color;
mod commands;
mod daemon_process;
mod env;
mod exit_error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::{daemon, demo, pending, show};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "cw", about = "Crash handoff to an out-of-process supervisor")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")"))]
#[command(styles = color::styles())]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Supervisor management
    Daemon(daemon::DaemonArgs),
    /// Display a crash report
    Show(show::ShowArgs),
    /// Report whether a crash is waiting in the fallback record
    Pending,
    /// Install the crash hook and crash on purpose
    Demo(demo::DemoArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit) = e.downcast_ref::<ExitError>() {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                return exit.exit_code();
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.output;
    match cli.command {
        Commands::Daemon(args) => daemon::daemon(args, format).await,
        Commands::Show(args) => show::show(args, format),
        Commands::Pending => pending::pending(format),
        Commands::Demo(args) => demo::demo(args),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
