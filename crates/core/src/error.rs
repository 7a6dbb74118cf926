// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stable error-code taxonomy shared by every layer (spec §7).
//!
//! Individual crates define their own `thiserror` enums for internal detail;
//! anything that crosses the daemon's HTTP boundary is mapped down to one of
//! these codes so clients can match on a closed, stable vocabulary.

use serde::{Deserialize, Serialize};

/// A stable, closed set of error codes returned at the daemon boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RuntimeUnavailable,
    NotReady,
    StaleState,
    AlreadyRunning,
    ConcurrentModification,
    UnknownProject,
    ProjectConflict,
    UnknownToken,
    InvalidScope,
    Unauthorized,
    InvalidRequest,
    Timeout,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RuntimeUnavailable => "runtime-unavailable",
            ErrorCode::NotReady => "not-ready",
            ErrorCode::StaleState => "stale-state",
            ErrorCode::AlreadyRunning => "already-running",
            ErrorCode::ConcurrentModification => "concurrent-modification",
            ErrorCode::UnknownProject => "unknown-project",
            ErrorCode::ProjectConflict => "project-conflict",
            ErrorCode::UnknownToken => "unknown-token",
            ErrorCode::InvalidScope => "invalid-scope",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::InvalidRequest => "invalid-request",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The body of every non-2xx daemon response (§7: `{code, message, details?}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: None }
    }

    pub fn internal(correlation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: message.into(),
            details: Some(serde_json::json!({ "correlationId": correlation_id.into() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_round_trips_through_json() {
        let err = ApiError::new(ErrorCode::ProjectConflict, "name already taken");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"project-conflict\""));
        let back: ApiError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, ErrorCode::ProjectConflict);
    }
}
