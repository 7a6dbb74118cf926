// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `StatusSnapshot` aggregate (spec §3, §4.F) and the exposure state
//! machine that feeds its gateway section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ProjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonReadiness {
    Starting,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaemonStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub readiness: DaemonReadiness,
    pub pid_file_exists: bool,
    pub socket_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub ok: bool,
    pub last_checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ok_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
    pub reset_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
}

/// Sidecar-persisted half of [`RuntimeStatus`] (spec §4.F item 3): the parts
/// that must survive across reconciliations, as opposed to `ok`/`lastCheckedAt`/
/// `errorText` which are recomputed every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeHealthCounters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ok_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reset_count: u64,
    #[serde(default)]
    pub was_ok: bool,
}

impl RuntimeHealthCounters {
    /// Apply a fresh observation, returning the updated counters. `resetCount`
    /// increments only on a false→true transition (spec §4.F item 3).
    pub fn observe(&self, ok: bool, now: DateTime<Utc>) -> RuntimeHealthCounters {
        let transitioned_to_ok = ok && !self.was_ok;
        RuntimeHealthCounters {
            last_ok_at: if ok { Some(now) } else { self.last_ok_at },
            reset_at: if transitioned_to_ok { Some(now) } else { self.reset_at },
            reset_count: self.reset_count + u64::from(transitioned_to_ok),
            was_ok: ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectRollupStatus {
    Running,
    Stopped,
    Missing,
    Unregistered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub id: ProjectId,
    pub name: String,
    pub status: ProjectRollupStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_host: Option<String>,
    pub defined_services: Vec<String>,
    pub running_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExposureKind {
    LocalNetwork,
    MeshVpn,
    PublicTunnel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExposureState {
    Disabled,
    NeedsConfig,
    Configured,
    Running,
    Blocked,
    Unknown,
}

/// Signals the reconciler gathers about one exposure kind before folding them
/// into an [`ExposureState`] (spec §4.F "Exposure state machine").
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureSignals {
    pub extension_enabled: bool,
    pub dependencies_present: bool,
    pub minimal_config_present: bool,
    pub daemon_running: bool,
    pub bind_satisfies_exposure: bool,
    pub dependency_missing: bool,
    pub dependency_malformed: bool,
}

impl ExposureSignals {
    /// Fold the gathered signals into a single state, applying the tie-break
    /// rule: `blocked` beats `needs-config`; `unknown` only when nothing else
    /// applies.
    pub fn resolve(&self) -> ExposureState {
        if !self.extension_enabled {
            return ExposureState::Disabled;
        }
        let blocked = !self.daemon_running
            || (self.minimal_config_present && !self.bind_satisfies_exposure)
            || self.dependency_missing;
        if blocked {
            return ExposureState::Blocked;
        }
        if self.dependency_malformed {
            return ExposureState::Unknown;
        }
        if !self.dependencies_present || !self.minimal_config_present {
            return ExposureState::NeedsConfig;
        }
        if self.daemon_running && self.bind_satisfies_exposure {
            return ExposureState::Running;
        }
        ExposureState::Configured
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExposureStatus {
    pub kind: ExposureKind,
    pub state: ExposureState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStatus {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub allow_writes: bool,
    pub exposures: Vec<ExposureStatus>,
    pub active_token_count: u64,
    pub revoked_token_count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubsystemSummary {
    pub ok: bool,
    pub runtime_ok: bool,
    pub reverse_proxy_ok: bool,
    pub logging_ok: bool,
    pub network_ok: bool,
}

impl SubsystemSummary {
    /// Invariant S1: `summary.ok` is exactly the conjunction of the four
    /// subsystem flags.
    pub fn new(runtime_ok: bool, reverse_proxy_ok: bool, logging_ok: bool, network_ok: bool) -> Self {
        SubsystemSummary {
            ok: runtime_ok && reverse_proxy_ok && logging_ok && network_ok,
            runtime_ok,
            reverse_proxy_ok,
            logging_ok,
            network_ok,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub version: u64,
    pub generated_at: DateTime<Utc>,
    pub daemon: DaemonStatus,
    pub runtime: RuntimeStatus,
    pub projects: Vec<ProjectStatus>,
    pub gateway: GatewayStatus,
    pub summary: SubsystemSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_ok_is_conjunction_of_subsystems() {
        let s = SubsystemSummary::new(true, true, true, false);
        assert!(!s.ok);
        let s = SubsystemSummary::new(true, true, true, true);
        assert!(s.ok);
    }

    #[test]
    fn runtime_counters_increment_reset_count_only_on_false_to_true() {
        let base = RuntimeHealthCounters::default();
        let now = Utc::now();
        let still_down = base.observe(false, now);
        assert_eq!(still_down.reset_count, 0);
        let recovered = still_down.observe(true, now);
        assert_eq!(recovered.reset_count, 1);
        assert_eq!(recovered.reset_at, Some(now));
        let still_up = recovered.observe(true, now);
        assert_eq!(still_up.reset_count, 1, "no double-count while staying ok");
    }

    #[test]
    fn exposure_blocked_wins_over_needs_config() {
        let signals = ExposureSignals {
            extension_enabled: true,
            dependencies_present: false,
            minimal_config_present: false,
            daemon_running: false,
            bind_satisfies_exposure: false,
            dependency_missing: false,
            dependency_malformed: false,
        };
        assert_eq!(signals.resolve(), ExposureState::Blocked);
    }

    #[test]
    fn exposure_reaches_running_when_fully_satisfied() {
        let signals = ExposureSignals {
            extension_enabled: true,
            dependencies_present: true,
            minimal_config_present: true,
            daemon_running: true,
            bind_satisfies_exposure: true,
            dependency_missing: false,
            dependency_malformed: false,
        };
        assert_eq!(signals.resolve(), ExposureState::Running);
    }

    #[test]
    fn exposure_disabled_when_extension_off() {
        let signals = ExposureSignals::default();
        assert_eq!(signals.resolve(), ExposureState::Disabled);
    }
}
