// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health Probes (spec §4.E): stateless predicates evaluated concurrently
//! with a bounded per-check deadline.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, ToSocketAddrs};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1500);
pub const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub status: ProbeOutcome,
    pub message: String,
    pub duration_ms: u64,
}

impl ProbeResult {
    fn ok(message: impl Into<String>, elapsed: Duration) -> Self {
        ProbeResult { status: ProbeOutcome::Ok, message: message.into(), duration_ms: elapsed.as_millis() as u64 }
    }

    fn warn(message: impl Into<String>, elapsed: Duration) -> Self {
        ProbeResult { status: ProbeOutcome::Warn, message: message.into(), duration_ms: elapsed.as_millis() as u64 }
    }

    fn error(message: impl Into<String>, elapsed: Duration) -> Self {
        ProbeResult { status: ProbeOutcome::Error, message: message.into(), duration_ms: elapsed.as_millis() as u64 }
    }
}

/// Run `probe` under the given timeout, collapsing a timeout into `warn`
/// rather than `error` (spec §4.E: "never `error`").
async fn with_timeout<F>(timeout: Duration, probe: F) -> ProbeResult
where
    F: std::future::Future<Output = ProbeResult>,
{
    let start = Instant::now();
    match tokio::time::timeout(timeout, probe).await {
        Ok(result) => result,
        Err(_) => ProbeResult::warn("timed out", start.elapsed()),
    }
}

/// Binary availability: a path lookup on `PATH`.
pub async fn probe_binary_available(name: &str, timeout: Duration) -> ProbeResult {
    let name = name.to_string();
    with_timeout(timeout, async move {
        let start = Instant::now();
        let found = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).any(|dir| dir.join(&name).is_file()))
            .unwrap_or(false);
        if found {
            ProbeResult::ok(format!("{name} found on PATH"), start.elapsed())
        } else {
            ProbeResult::error(format!("{name} not found on PATH"), start.elapsed())
        }
    })
    .await
}

/// File existence at a well-known global path.
pub async fn probe_file_exists(path: &Path, timeout: Duration) -> ProbeResult {
    let path = path.to_path_buf();
    with_timeout(timeout, async move {
        let start = Instant::now();
        if path.exists() {
            ProbeResult::ok(format!("{} exists", path.display()), start.elapsed())
        } else {
            ProbeResult::error(format!("{} does not exist", path.display()), start.elapsed())
        }
    })
    .await
}

/// TCP reachability of a `host:port` pair.
pub async fn probe_tcp_reachable(addr: &str, timeout: Duration) -> ProbeResult {
    let addr = addr.to_string();
    with_timeout(timeout, async move {
        let start = Instant::now();
        match TcpStream::connect(&addr).await {
            Ok(_) => ProbeResult::ok(format!("{addr} reachable"), start.elapsed()),
            Err(e) => ProbeResult::error(format!("{addr} unreachable: {e}"), start.elapsed()),
        }
    })
    .await
}

/// DNS A/AAAA resolution, optionally asserting a designated address.
pub async fn probe_dns_resolves(host: &str, expect: Option<IpAddr>, timeout: Duration) -> ProbeResult {
    let host = host.to_string();
    with_timeout(timeout, async move {
        let start = Instant::now();
        let lookup = format!("{host}:0");
        let resolved = tokio::task::spawn_blocking(move || {
            lookup.to_socket_addrs().map(|it| it.map(|a| a.ip()).collect::<Vec<_>>())
        })
        .await;
        match resolved {
            Ok(Ok(addrs)) if addrs.is_empty() => ProbeResult::error(format!("{host} did not resolve"), start.elapsed()),
            Ok(Ok(addrs)) => match expect {
                Some(expected) if !addrs.contains(&expected) => {
                    ProbeResult::error(format!("{host} did not resolve to {expected}"), start.elapsed())
                }
                _ => ProbeResult::ok(format!("{host} resolves"), start.elapsed()),
            },
            Ok(Err(e)) => ProbeResult::error(format!("{host} resolution failed: {e}"), start.elapsed()),
            Err(e) => ProbeResult::error(format!("resolution task failed: {e}"), start.elapsed()),
        }
    })
    .await
}

/// Named network existence (and optional subnet assertion), via the
/// container runtime's `network inspect`.
pub async fn probe_network_exists(name: &str, expect_subnet: Option<&str>, timeout: Duration) -> ProbeResult {
    let name = name.to_string();
    let expect_subnet = expect_subnet.map(str::to_string);
    with_timeout(timeout, async move {
        let start = Instant::now();
        let output = tokio::process::Command::new("docker")
            .args(["network", "inspect", &name, "--format", "{{range .IPAM.Config}}{{.Subnet}}{{end}}"])
            .output()
            .await;
        match output {
            Ok(out) if out.status.success() => {
                let subnet = String::from_utf8_lossy(&out.stdout).trim().to_string();
                match expect_subnet {
                    Some(expected) if subnet != expected => {
                        ProbeResult::error(format!("network {name} subnet {subnet} != {expected}"), start.elapsed())
                    }
                    _ => ProbeResult::ok(format!("network {name} exists"), start.elapsed()),
                }
            }
            Ok(out) => ProbeResult::error(
                format!("network {name} not found: {}", String::from_utf8_lossy(&out.stderr).trim()),
                start.elapsed(),
            ),
            Err(e) => ProbeResult::error(format!("docker unavailable: {e}"), start.elapsed()),
        }
    })
    .await
}

/// Runtime reachability: did the inventory gather return without error.
pub fn probe_runtime_reachability(inventory_ok: bool, elapsed: Duration) -> ProbeResult {
    if inventory_ok {
        ProbeResult::ok("inventory gathered", elapsed)
    } else {
        ProbeResult::error("inventory gather failed", elapsed)
    }
}

#[cfg(test)]
#[path = "probes_tests.rs"]
mod tests;
