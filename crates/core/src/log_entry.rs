// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `LogEntry` entity (spec §3, §4.G). Transient — never persisted by
//! the core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    ContainerRuntime,
    LogStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Numeric-severity mapping used when a JSON payload's `level` field is a
    /// number (spec §4.G): >=50 error, >=40 warn, >=30 info, else debug.
    pub fn from_numeric(n: i64) -> Self {
        if n >= 50 {
            LogLevel::Error
        } else if n >= 40 {
            LogLevel::Warn
        } else if n >= 30 {
            LogLevel::Info
        } else {
            LogLevel::Debug
        }
    }

    /// Case-insensitive parse of a well-known level token.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "TRACE" | "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" | "WARNING" => Some(LogLevel::Warn),
            "ERROR" | "FATAL" | "PANIC" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub source: LogSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<LogStream>,
    pub message: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_level_mapping_matches_spec_thresholds() {
        assert_eq!(LogLevel::from_numeric(60), LogLevel::Error);
        assert_eq!(LogLevel::from_numeric(50), LogLevel::Error);
        assert_eq!(LogLevel::from_numeric(49), LogLevel::Warn);
        assert_eq!(LogLevel::from_numeric(40), LogLevel::Warn);
        assert_eq!(LogLevel::from_numeric(39), LogLevel::Info);
        assert_eq!(LogLevel::from_numeric(30), LogLevel::Info);
        assert_eq!(LogLevel::from_numeric(29), LogLevel::Debug);
    }

    #[test]
    fn token_parse_is_case_insensitive() {
        assert_eq!(LogLevel::parse("warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("PANIC"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("chatty"), None);
    }
}
