// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `DaemonState` entity (spec §3, §4.A): what the supervisor persists
//! about a running daemon as a pidfile/socket pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    Starting,
    Running,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaemonState {
    pub pid: u32,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launchd_plist_path: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub readiness: Readiness,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_round_trips_through_json() {
        let json = serde_json::to_string(&Readiness::Starting).unwrap();
        assert_eq!(json, "\"starting\"");
        let back: Readiness = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Readiness::Starting);
    }
}
