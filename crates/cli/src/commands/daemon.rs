// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cw daemon` - Supervisor management commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use cw_wire::SupervisorStatus;
use std::process::Command;

use crate::client::SupervisorClient;
use crate::output::{display_log, format_or_json, format_uptime, read_last_lines, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the supervisor (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the supervisor once its fallback poll is done
    Stop,
    /// Check supervisor status
    Status,
    /// View supervisor logs
    Logs {
        /// Number of recent lines to show (default: 200)
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
        /// Show all lines (no limit)
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
        /// Follow log output
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    let client = SupervisorClient::from_env()?;
    match args.command {
        DaemonCommand::Start { foreground } => start(&client, foreground).await,
        DaemonCommand::Stop => stop(&client).await,
        DaemonCommand::Status => status(&client, format).await,
        DaemonCommand::Logs { limit, no_limit, follow } => {
            logs(&client, limit, no_limit, follow, format).await
        }
    }
}

async fn start(client: &SupervisorClient, foreground: bool) -> Result<()> {
    let program = cw_hook::find_supervisor_binary();
    if foreground {
        let status = Command::new(&program).status()?;
        if !status.success() {
            return Err(anyhow!("Supervisor exited with status: {}", status));
        }
        return Ok(());
    }

    if let Ok(status) = client.status().await {
        println!("Supervisor already running (uptime: {})", format_uptime(status.uptime_secs));
        return Ok(());
    }

    client
        .connect_or_start(&program, crate::env::start_timeout())
        .await
        .map_err(|e| anyhow!("{}", e))?;
    println!("Supervisor started");
    Ok(())
}

async fn stop(client: &SupervisorClient) -> Result<()> {
    match client.shutdown().await {
        Ok(true) => {
            println!("Supervisor stopping");
            Ok(())
        }
        Ok(false) => {
            println!("Supervisor not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("Failed to stop supervisor: {}", e)),
    }
}

async fn status(client: &SupervisorClient, format: OutputFormat) -> Result<()> {
    let status = match client.status().await {
        Ok(status) => status,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    let obj = status_json(&status, &version);
    format_or_json(format, &obj, || {
        println!("Status: running ({})", status.phase);
        println!("Version: {}", version);
        println!("PID: {}", status.pid);
        println!("Uptime: {}", format_uptime(status.uptime_secs));
        println!("Clients: {} bound", status.bound_clients);
        println!("Crashes presented: {}", status.presented);
        if !status.poll_finished {
            println!("Fallback poll: in progress");
        }
        if status.stop_requested {
            println!("Stop requested: will exit when idle");
        }
    })
}

fn status_json(status: &SupervisorStatus, version: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "running",
        "version": version,
        "phase": status.phase,
        "pid": status.pid,
        "uptime_secs": status.uptime_secs,
        "uptime": format_uptime(status.uptime_secs),
        "bound_clients": status.bound_clients,
        "presented": status.presented,
        "poll_finished": status.poll_finished,
        "stop_requested": status.stop_requested,
    })
}

async fn logs(
    client: &SupervisorClient,
    limit: usize,
    no_limit: bool,
    follow: bool,
    format: OutputFormat,
) -> Result<()> {
    let log_path = client.log_path();

    if !log_path.exists() {
        let empty: Vec<String> = vec![];
        let obj = serde_json::json!({
            "log_path": log_path.to_string_lossy().into_owned(),
            "lines": empty,
        });
        return format_or_json(format, &obj, || {
            println!("No log file found at {}", log_path.display())
        });
    }

    let content = if no_limit {
        std::fs::read_to_string(log_path)?
    } else {
        read_last_lines(log_path, limit)?
    };
    display_log(log_path, &content, follow, format).await
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("Supervisor not running"))
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
