// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor's own status report (spec §4.I), distinct from
//! [`hack_core::StatusSnapshot`]: this is answerable without the daemon's
//! HTTP server being up at all.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupervisorStatus {
    Running,
    Starting,
    Stale,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorStatusReport {
    pub status: SupervisorStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub process_running: bool,
    pub api_ok: bool,
    pub socket_exists: bool,
    pub log_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}
