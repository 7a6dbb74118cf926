// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Supervisor (spec §4.I): `start`/`stop`/`restart`/`status` over the
//! pid/socket pair, answerable without the HTTP server necessarily being up.

use std::time::Duration;

use hack_wire::{SupervisorStatus, SupervisorStatusReport};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::{info, warn};

use crate::config::Config;
use crate::paths;

const START_POLL_INTERVAL: Duration = Duration::from_millis(150);
const START_TIMEOUT: Duration = Duration::from_secs(2);
const STOP_GRACE: Duration = Duration::from_secs(2);
const STATUS_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("hackd is already running (pid {0})")]
    AlreadyRunning(u32),
    #[error("hackd did not become ready within the startup window")]
    StartTimedOut,
    #[error("no running hackd to stop")]
    NotRunning,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A minimal HTTP/1.1 GET over the unix socket, just enough to tell whether
/// the server is answering `/v1/status` (spec §4.I "status" uses an API
/// ping, not just pid liveness).
async fn probe_api(socket_path: &std::path::Path) -> bool {
    let probe = async {
        let mut stream = UnixStream::connect(socket_path).await.ok()?;
        stream.write_all(b"GET /v1/status HTTP/1.1\r\nHost: hackd\r\nConnection: close\r\n\r\n").await.ok()?;
        let mut buf = [0u8; 32];
        let n = stream.read(&mut buf).await.ok()?;
        Some(buf[..n].starts_with(b"HTTP/1.1 200"))
    };
    tokio::time::timeout(STATUS_PROBE_TIMEOUT, probe).await.ok().flatten().unwrap_or(false)
}

/// Report the supervisor's view of the daemon (spec §4.I "status").
pub async fn status(config: &Config) -> SupervisorStatusReport {
    let pid = paths::read_pid(config);
    let process_running = pid.map(paths::process_alive).unwrap_or(false);
    let socket_exists = config.socket_path.exists();
    let log_exists = config.log_path.exists();
    let api_ok = if socket_exists { probe_api(&config.socket_path).await } else { false };

    let (status, stale_reason) = match (process_running, api_ok) {
        (true, true) => (SupervisorStatus::Running, None),
        (true, false) => (SupervisorStatus::Starting, None),
        (false, _) if pid.is_none() && socket_exists => (SupervisorStatus::Stale, Some("socket-only".to_string())),
        (false, _) if pid.is_some() => (SupervisorStatus::Stale, Some("pid-not-running".to_string())),
        (false, _) => (SupervisorStatus::Stopped, None),
    };

    SupervisorStatusReport { status, pid, process_running, api_ok, socket_exists, log_exists, stale_reason }
}

/// Launch `hackd run` as a detached child and poll `/v1/status` until it
/// answers or the startup window elapses (spec §4.I "start").
pub async fn start(config: &Config, exe: &std::path::Path) -> Result<(), SupervisorError> {
    let report = status(config).await;
    if matches!(report.status, SupervisorStatus::Running) {
        return Err(SupervisorError::AlreadyRunning(report.pid.unwrap_or(0)));
    }
    if matches!(report.status, SupervisorStatus::Stale) {
        warn!("clearing stale pid/socket state before start");
        let _ = std::fs::remove_file(&config.pid_path);
        let _ = std::fs::remove_file(&config.socket_path);
    }

    tokio::process::Command::new(exe)
        .arg("run")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;

    let deadline = tokio::time::Instant::now() + START_TIMEOUT;
    loop {
        if probe_api(&config.socket_path).await {
            info!("hackd reported ready");
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(SupervisorError::StartTimedOut);
        }
        tokio::time::sleep(START_POLL_INTERVAL).await;
    }
}

/// SIGTERM, then escalate to SIGKILL if the process outlives the grace
/// window (spec §4.I "stop").
#[cfg(unix)]
pub async fn stop(config: &Config) -> Result<(), SupervisorError> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let pid = paths::read_pid(config).ok_or(SupervisorError::NotRunning)?;
    if !paths::process_alive(pid) {
        return Err(SupervisorError::NotRunning);
    }

    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    let deadline = tokio::time::Instant::now() + STOP_GRACE;
    while paths::process_alive(pid) {
        if tokio::time::Instant::now() >= deadline {
            warn!(pid, "escalating to SIGKILL after grace period");
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Ok(())
}

pub async fn restart(config: &Config, exe: &std::path::Path) -> Result<(), SupervisorError> {
    let _ = stop(config).await;
    start(config, exe).await
}
