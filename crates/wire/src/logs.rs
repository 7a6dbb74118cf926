// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelopes streamed over `/v1/logs` (spec §4.G "Event stream").

use hack_core::LogEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogStreamEvent {
    /// Emitted once when the stream opens, carrying the selector context.
    Start { selector: String },
    Log { entry: LogEntry },
    /// Also used for the `dropped:<count>` backpressure marker (spec §4.G).
    Error { reason: String },
    /// `reason` is `"eof"` or `"exit:<code>"`.
    End { reason: String },
}

/// Query parameters accepted by `GET /v1/logs` (spec §8 scenario 5).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub follow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}
