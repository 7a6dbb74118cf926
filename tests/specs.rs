//! End-to-end specs for `hackd` (spec §8): spawns the real binary against a
//! scratch state root and drives it over its Unix socket, the way a real
//! client would.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use serde_json::{json, Value};
use tempfile::TempDir;

const WAIT_MAX: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn hackd_bin() -> PathBuf {
    cargo_bin("hackd")
}

fn wait_for(max: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + max;
    loop {
        if predicate() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// A scratch `hackd` instance: its own state root, started and stopped
/// through the real `start`/`stop` subcommands rather than the `run`
/// subcommand directly, exercising the supervisor the way a caller would.
struct Daemon {
    root: TempDir,
}

impl Daemon {
    fn new() -> Self {
        Daemon { root: tempfile::tempdir().expect("tempdir") }
    }

    fn command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(hackd_bin());
        cmd.env("HACK_STATE_ROOT", self.root.path());
        cmd
    }

    fn start(&self) {
        let output = self.command().arg("start").output().expect("spawn hackd start");
        assert!(
            output.status.success(),
            "hackd start failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn stop(&self) {
        let _ = self.command().arg("stop").output();
    }

    fn status(&self) -> Value {
        let output = self.command().arg("status").output().expect("spawn hackd status");
        serde_json::from_slice(&output.stdout).expect("status output is JSON")
    }

    fn socket_path(&self) -> PathBuf {
        self.root.path().join("hackd.sock")
    }

    fn pid_path(&self) -> PathBuf {
        self.root.path().join("hackd.pid")
    }

    fn kill9(&self) {
        let pid = std::fs::read_to_string(self.pid_path()).expect("pid file").trim().to_string();
        let status = std::process::Command::new("kill").args(["-9", &pid]).status().expect("run kill -9");
        assert!(status.success(), "kill -9 {pid} failed");
    }

    fn request(&self, method: &str, path: &str, body: Option<&Value>) -> (u16, Value) {
        self.request_with_headers(method, path, body, &[])
    }

    fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        extra_headers: &[(&str, &str)],
    ) -> (u16, Value) {
        let (status, text) = self.raw_request(method, path, body, extra_headers);
        let value = if text.trim().is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap_or(Value::Null) };
        (status, value)
    }

    /// A minimal HTTP/1.1 request/response round trip over the trusted Unix
    /// socket, mirroring the supervisor's own `probe_api` (spec §4.I).
    fn raw_request(&self, method: &str, path: &str, body: Option<&Value>, extra_headers: &[(&str, &str)]) -> (u16, String) {
        let payload = body.map(|b| serde_json::to_vec(b).expect("serialize body"));

        let mut stream = UnixStream::connect(self.socket_path()).expect("connect to hackd socket");
        stream.set_read_timeout(Some(Duration::from_secs(5))).expect("set read timeout");

        let mut request = format!("{method} {path} HTTP/1.1\r\nHost: hackd\r\nConnection: close\r\n");
        for (key, value) in extra_headers {
            request.push_str(&format!("{key}: {value}\r\n"));
        }
        if let Some(payload) = &payload {
            request.push_str("Content-Type: application/json\r\n");
            request.push_str(&format!("Content-Length: {}\r\n", payload.len()));
        }
        request.push_str("\r\n");

        stream.write_all(request.as_bytes()).expect("write request head");
        if let Some(payload) = &payload {
            stream.write_all(payload).expect("write request body");
        }

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).expect("read response");
        let text = String::from_utf8_lossy(&raw).into_owned();

        let status_line = text.lines().next().expect("status line");
        let code: u16 = status_line.split_whitespace().nth(1).and_then(|s| s.parse().ok()).expect("status code");
        let body_start = text.find("\r\n\r\n").map(|i| i + 4).unwrap_or(text.len());
        (code, text[body_start..].to_string())
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.stop();
    }
}

fn wait_for_socket(daemon: &Daemon) {
    let socket = daemon.socket_path();
    assert!(wait_for(WAIT_MAX, || socket.exists()), "hackd never created its socket");
}

#[test]
fn upsert_inserts_new_project_on_fresh_registry() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let body = json!({
        "repoRoot": "/r",
        "projectDir": "/r/.hack",
        "name": "demo",
    });
    let (status, response) = daemon.request("POST", "/v1/projects", Some(&body));

    assert_eq!(status, 201);
    assert_eq!(response["status"], "inserted");
    let id = response["id"].as_str().expect("id is a string");
    assert!(id.starts_with("prj-"), "project id should carry the prj- prefix, got {id}");

    let (status, listed) = daemon.request("GET", "/v1/projects", None);
    assert_eq!(status, 200);
    assert_eq!(listed["projects"].as_array().expect("projects array").len(), 1);
    assert_eq!(listed["projects"][0]["name"], "demo");
    assert_eq!(listed["projects"][0]["repoRoot"], "/r");
}

#[test]
fn upsert_reports_conflict_on_slug_collision() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let first = json!({"repoRoot": "/r", "projectDir": "/r/.hack", "name": "demo"});
    let (status, _) = daemon.request("POST", "/v1/projects", Some(&first));
    assert_eq!(status, 201);

    let second = json!({"repoRoot": "/other", "projectDir": "/other/.hack", "name": "demo"});
    let (status, response) = daemon.request("POST", "/v1/projects", Some(&second));

    assert_eq!(status, 409);
    assert_eq!(response["status"], "conflict");
    assert_eq!(response["incumbent"]["repoRoot"], "/r");
    assert_eq!(response["incoming"]["repoRoot"], "/other");
}

#[test]
fn token_mint_list_revoke_round_trip() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let mint_body = json!({"scope": "write", "label": "ci"});
    let (status, minted) = daemon.request("POST", "/v1/tokens", Some(&mint_body));
    assert_eq!(status, 201);
    assert_eq!(minted["record"]["scope"], "write");
    assert!(minted["record"]["revokedAt"].is_null());
    let secret = minted["secret"].as_str().expect("secret is present on mint");
    assert!(!secret.is_empty());
    let id = minted["record"]["id"].as_str().expect("token id").to_string();
    assert!(id.starts_with("tok-"));

    let (status, listed) = daemon.request("GET", "/v1/tokens", None);
    assert_eq!(status, 200);
    let tokens = listed["tokens"].as_array().expect("tokens array");
    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].get("secret").is_none(), "the list view must never carry the plaintext secret");

    let (status, _) = daemon.request("DELETE", &format!("/v1/tokens/{id}"), None);
    assert_eq!(status, 204);

    let (status, listed) = daemon.request("GET", "/v1/tokens", None);
    assert_eq!(status, 200);
    assert!(!listed["tokens"][0]["revokedAt"].is_null());
}

#[test]
fn supervisor_reports_stale_after_kill_and_recovers_on_start() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let report = daemon.status();
    assert_eq!(report["status"], "running");

    daemon.kill9();

    let became_stale = wait_for(WAIT_MAX, || daemon.status()["status"] == "stale");
    assert!(became_stale, "supervisor should report stale once the pid stops answering signal 0");
    // kill9 leaves the pidfile in place pointing at a dead pid.
    assert_eq!(daemon.status()["staleReason"], "pid-not-running");

    // `start` clears the stale pid/socket pair and brings a fresh daemon up.
    daemon.start();
    let report = daemon.status();
    assert_eq!(report["status"], "running");
}

#[test]
fn log_stream_replays_empty_backlog_then_closes_without_follow() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let (status, text) = daemon.raw_request("GET", "/v1/logs?tail=10", None, &[]);
    assert_eq!(status, 200);

    let events: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|payload| serde_json::from_str(payload).expect("SSE payload is JSON"))
        .collect();

    assert_eq!(events.first().expect("start event")["type"], "start");
    assert_eq!(events.last().expect("end event")["type"], "end");
    assert_eq!(events.last().unwrap()["reason"], "eof");
}

#[test]
fn deadline_header_shorter_than_handler_elapses_with_timeout_code() {
    let daemon = Daemon::new();
    daemon.start();
    wait_for_socket(&daemon);

    let (status, response) = daemon.request_with_headers("GET", "/v1/status", None, &[("X-Deadline-Ms", "1")]);

    assert_eq!(status, 504);
    assert_eq!(response["code"], "timeout");
}
