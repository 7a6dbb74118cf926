// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP wire types for the `hackd` daemon server (spec §4.H).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod logs;
pub mod metrics;
pub mod projects;
pub mod supervisor;
pub mod tokens;

pub use events::StatusEvent;
pub use logs::{LogQuery, LogStreamEvent};
pub use metrics::MetricsResponse;
pub use projects::{ListProjectsResponse, UpsertOutcome, UpsertProjectRequest, UpsertProjectResponse};
pub use supervisor::{SupervisorStatus, SupervisorStatusReport};
pub use tokens::{ListTokensResponse, MintTokenRequest, MintTokenResponse, TokenRecordView};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_outcome_serializes_kebab_case() {
        let json = serde_json::to_string(&UpsertOutcome::Inserted).unwrap();
        assert_eq!(json, "\"inserted\"");
    }

    #[test]
    fn log_stream_event_uses_tagged_type_field() {
        let ev = LogStreamEvent::End { reason: "eof".to_string() };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "end");
        assert_eq!(json["reason"], "eof");
    }
}
