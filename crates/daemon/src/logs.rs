// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Log Pipeline (spec §4.G): tails the container runtime and an
//! optional log-store HTTP source, normalizes lines into [`LogEntry`], and
//! fans them out to `/v1/logs` subscribers with bounded backpressure.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hack_core::{LogEntry, LogLevel, LogSource, LogStream};
use hack_wire::LogStreamEvent;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::warn;

/// Backlog depth kept for `tail`/`since` replay and the broadcast lag
/// threshold for live subscribers (spec §4.G "bounded channel, default 4096").
const CHANNEL_CAPACITY: usize = 4096;
const REPLAY_BACKLOG: usize = 10_000;

#[derive(Clone)]
pub struct LogHub {
    sender: broadcast::Sender<LogStreamEvent>,
    backlog: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender, backlog: Arc::new(Mutex::new(VecDeque::with_capacity(REPLAY_BACKLOG))) }
    }

    pub fn publish(&self, entry: LogEntry) {
        let mut backlog = self.backlog.lock();
        if backlog.len() >= REPLAY_BACKLOG {
            backlog.pop_front();
        }
        backlog.push_back(entry.clone());
        drop(backlog);
        let _ = self.sender.send(LogStreamEvent::Log { entry });
    }

    pub fn publish_end(&self, reason: String) {
        let _ = self.sender.send(LogStreamEvent::End { reason });
    }

    /// Replay the retained backlog matching `tail`/`since`/`project`/`service`
    /// (spec §8 scenario 5), deduplicated on `(service, timestamp, message)`.
    pub fn replay(
        &self,
        tail: Option<usize>,
        since: Option<DateTime<Utc>>,
        project: Option<&str>,
        service: Option<&str>,
    ) -> Vec<LogEntry> {
        let backlog = self.backlog.lock();
        let mut seen: HashSet<(Option<String>, Option<DateTime<Utc>>, String)> = HashSet::new();
        let mut matched: Vec<LogEntry> = backlog
            .iter()
            .filter(|e| project.is_none_or(|p| e.project.as_deref() == Some(p)))
            .filter(|e| service.is_none_or(|s| e.service.as_deref() == Some(s)))
            .filter(|e| since.is_none_or(|cutoff| e.timestamp.is_none_or(|t| t >= cutoff)))
            .filter(|e| seen.insert((e.service.clone(), e.timestamp, e.message.clone())))
            .cloned()
            .collect();
        if let Some(n) = tail {
            let start = matched.len().saturating_sub(n);
            matched.drain(..start);
        }
        matched
    }

    /// Subscribe to the live stream. A lagged receiver (the broadcast ring
    /// overran it) surfaces as a `dropped:<count>` error event rather than a
    /// silent gap, matching the backpressure contract in spec §4.G.
    pub fn subscribe(&self) -> broadcast::Receiver<LogStreamEvent> {
        self.sender.subscribe()
    }

    /// Number of events queued in the broadcast ring that the slowest
    /// live subscriber hasn't yet consumed (spec §4.H `/v1/metrics`
    /// `logReaderQueueDepths`).
    pub fn queue_depth(&self) -> usize {
        self.sender.len()
    }
}

impl Default for LogHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a broadcast receive outcome into the stream event to forward,
/// or `None` if the stream has ended for this subscriber.
pub async fn next_event(rx: &mut broadcast::Receiver<LogStreamEvent>) -> Option<LogStreamEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                return Some(LogStreamEvent::Error { reason: format!("dropped:{n}") });
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Parse one `docker logs --timestamps` line: a leading RFC3339 timestamp,
/// a space, then the container's raw output (spec §4.G "Container runtime
/// source").
fn parse_container_line(raw: &str, project: &str, service: &str, instance: &str, stream: LogStream) -> LogEntry {
    let (timestamp, rest) = match raw.split_once(' ') {
        Some((ts, rest)) => match DateTime::parse_from_rfc3339(ts) {
            Ok(parsed) => (Some(parsed.with_timezone(&Utc)), rest),
            Err(_) => (None, raw),
        },
        None => (None, raw),
    };

    let level = infer_level(rest).unwrap_or(LogLevel::Info);

    LogEntry {
        source: LogSource::ContainerRuntime,
        timestamp,
        level,
        service: Some(service.to_string()),
        project: Some(project.to_string()),
        instance: Some(instance.to_string()),
        stream: Some(stream),
        message: rest.to_string(),
        fields: Default::default(),
        raw: raw.to_string(),
    }
}

/// Best-effort level inference from a free-form line: the first whitespace-
/// delimited token that matches a known level name wins (spec §4.G "falls
/// back to info when no level is recoverable").
fn infer_level(line: &str) -> Option<LogLevel> {
    line.split(|c: char| !c.is_ascii_alphabetic()).find_map(LogLevel::parse)
}

/// Spawn `docker logs --timestamps --no-color --tail <tail> -f <container>`,
/// publishing every line from stdout and stderr (grounded on the same
/// `docker`-shell-out idiom as the container inventory gatherer).
pub fn spawn_docker_follower(
    hub: LogHub,
    container_id: String,
    project: String,
    service: String,
    instance: String,
    tail: usize,
) {
    tokio::spawn(async move {
        let mut child = match tokio::process::Command::new("docker")
            .args(["logs", "--timestamps", "--no-color", "--tail", &tail.to_string(), "-f", &container_id])
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
        {
            Ok(c) => c,
            Err(e) => {
                warn!(container_id, error = %e, "failed to spawn docker logs");
                hub.publish_end(format!("error:{e}"));
                return;
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let stdout_task = stdout.map(|out| {
            let hub = hub.clone();
            let (project, service, instance) = (project.clone(), service.clone(), instance.clone());
            tokio::spawn(pump_lines(out, hub, project, service, instance, LogStream::Stdout))
        });
        let stderr_task = stderr.map(|err| {
            let hub = hub.clone();
            let (project, service, instance) = (project.clone(), service.clone(), instance.clone());
            tokio::spawn(pump_lines(err, hub, project, service, instance, LogStream::Stderr))
        });

        let status = child.wait().await;
        if let Some(t) = stdout_task {
            let _ = t.await;
        }
        if let Some(t) = stderr_task {
            let _ = t.await;
        }

        let reason = match status {
            Ok(s) => format!("exit:{}", s.code().unwrap_or(-1)),
            Err(_) => "eof".to_string(),
        };
        hub.publish_end(reason);
    });
}

async fn pump_lines<R: tokio::io::AsyncRead + Unpin>(
    reader: R,
    hub: LogHub,
    project: String,
    service: String,
    instance: String,
    stream: LogStream,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        hub.publish(parse_container_line(&line, &project, &service, &instance, stream));
    }
}

/// Poll an HTTP log store for `{labels, timestampNs, line}` tuples (spec
/// §4.G "Log-store source"), tracking a cursor so re-polls don't replay
/// already-published entries.
pub fn spawn_log_store_poller(hub: LogHub, base_url: String, poll_interval: std::time::Duration) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut cursor_ns: i64 = 0;
        loop {
            tokio::time::sleep(poll_interval).await;
            let url = format!("{base_url}?since_ns={cursor_ns}");
            let Ok(resp) = client.get(&url).send().await else { continue };
            let Ok(tuples) = resp.json::<Vec<LogStoreTuple>>().await else { continue };
            for tuple in tuples {
                cursor_ns = cursor_ns.max(tuple.timestamp_ns);
                hub.publish(tuple.into_entry());
            }
        }
    });
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogStoreTuple {
    #[serde(default)]
    labels: std::collections::BTreeMap<String, String>,
    timestamp_ns: i64,
    line: String,
}

impl LogStoreTuple {
    fn into_entry(self) -> LogEntry {
        let timestamp = Some(DateTime::from_timestamp_nanos(self.timestamp_ns).to_utc());
        let level = infer_level(&self.line)
            .or_else(|| self.labels.get("level").and_then(|l| LogLevel::parse(l)))
            .unwrap_or(LogLevel::Info);
        LogEntry {
            source: LogSource::LogStore,
            timestamp,
            level,
            service: self.labels.get("service").cloned(),
            project: self.labels.get("project").cloned(),
            instance: self.labels.get("instance").cloned(),
            stream: None,
            message: self.line.clone(),
            fields: self.labels,
            raw: self.line,
        }
    }
}
