// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's explicit configuration record (spec §6, §9 "Ambient CLI
//! context / configuration object"): populated from the well-known state
//! root plus the two honored environment overrides.

use std::path::{Path, PathBuf};

use hack_status::GatewayConfig;

const STATE_ROOT_ENV: &str = "HACK_STATE_ROOT";
const SOCKET_ENV: &str = "HACK_DAEMON_SOCKET";

#[derive(Debug, Clone)]
pub struct Config {
    pub state_root: PathBuf,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    pub registry_path: PathBuf,
    pub tokens_path: PathBuf,
    pub runtime_counters_path: PathBuf,
    pub gateway_config_path: PathBuf,
}

impl Config {
    /// Resolve from the environment, defaulting the state root to `~/.hack`
    /// (spec §6 pins this literal default, diverging from any XDG chain).
    pub fn resolve() -> Self {
        let state_root = std::env::var_os(STATE_ROOT_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_state_root);
        let socket_path = std::env::var_os(SOCKET_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| state_root.join("hackd.sock"));
        Self::with_roots(state_root, socket_path)
    }

    fn with_roots(state_root: PathBuf, socket_path: PathBuf) -> Self {
        Config {
            pid_path: state_root.join("hackd.pid"),
            log_path: state_root.join("hackd.log"),
            registry_path: state_root.join("registry.json"),
            tokens_path: state_root.join("tokens.json"),
            runtime_counters_path: state_root.join("runtime-counters.json"),
            gateway_config_path: state_root.join("gateway.json"),
            state_root,
            socket_path,
        }
    }

    #[cfg(test)]
    pub fn under(state_root: impl Into<PathBuf>) -> Self {
        let state_root = state_root.into();
        let socket_path = state_root.join("hackd.sock");
        Self::with_roots(state_root, socket_path)
    }

    pub fn load_gateway_config(&self) -> GatewayConfig {
        std::fs::read_to_string(&self.gateway_config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// A copy with secrets/paths scrubbed, safe to log or expose to tests;
    /// there is currently nothing sensitive in `Config` itself, but this
    /// keeps the call site stable if that changes.
    pub fn sanitized(&self) -> Self {
        self.clone()
    }
}

fn default_state_root() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".hack")
}

pub fn ensure_state_root(root: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_roots_derives_every_sidecar_path() {
        let config = Config::under("/tmp/example-root");
        assert_eq!(config.registry_path, PathBuf::from("/tmp/example-root/registry.json"));
        assert_eq!(config.tokens_path, PathBuf::from("/tmp/example-root/tokens.json"));
        assert_eq!(config.pid_path, PathBuf::from("/tmp/example-root/hackd.pid"));
    }
}
