// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Status Reconciler (spec §4.F): composes sections A-E into a
//! [`StatusSnapshot`].
//!
//! Gathering the sections (shelling out, probing) is the caller's job
//! (`hack-daemon`, which owns the 3 s wall-clock budget); this module is the
//! pure composition step so it can be unit tested without any IO.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use hack_adapters::{Inventory, ProbeOutcome};
use hack_core::{
    DaemonStatus, ExposureSignals, ExposureStatus, GatewayStatus, Project, ProjectRollupStatus,
    ProjectStatus, RuntimeHealthCounters, RuntimeStatus, StatusSnapshot, SubsystemSummary,
};

use crate::gateway::{bind_satisfies, GatewayConfig};

static SNAPSHOT_VERSION: AtomicU64 = AtomicU64::new(0);

/// Everything the reconciler needs that isn't already pure data: the
/// concurrently-gathered results of sections A-E (spec §4.F item 1).
pub struct ReconcileInputs<'a> {
    pub now: DateTime<Utc>,
    pub daemon: DaemonStatus,
    pub registry_projects: &'a [Project],
    pub inventory: &'a Inventory,
    pub include_unregistered: bool,
    pub runtime_reachable: bool,
    pub reverse_proxy_ok: bool,
    pub logging_ok: bool,
    pub network_ok: bool,
    pub runtime_counters: RuntimeHealthCounters,
    pub gateway_config: &'a GatewayConfig,
    pub daemon_running: bool,
    pub active_token_count: u64,
    pub revoked_token_count: u64,
}

fn defined_services_for(project_dir: &std::path::Path) -> Vec<String> {
    // The declarative compose file, when readable, names the defined
    // services; an unreadable or absent file yields no names rather than
    // an error (spec §4.F item 2).
    let candidates = ["docker-compose.yml", "docker-compose.yaml", "compose.yml", "compose.yaml"];
    for name in candidates {
        let path = project_dir.join(name);
        if let Ok(contents) = std::fs::read_to_string(&path) {
            return contents
                .lines()
                .skip_while(|l| !l.trim_start().starts_with("services:"))
                .skip(1)
                .take_while(|l| l.starts_with("  ") || l.starts_with('\t'))
                .filter_map(|l| {
                    let trimmed = l.trim_start();
                    if trimmed.ends_with(':') && !trimmed.starts_with('-') {
                        Some(trimmed.trim_end_matches(':').to_string())
                    } else {
                        None
                    }
                })
                .collect();
        }
    }
    Vec::new()
}

fn project_status(
    project: &Project,
    inventory: &Inventory,
) -> ProjectStatus {
    let running_count = inventory.running_count(&project.name);
    let dir_missing = !project.project_dir.exists();
    let status = if dir_missing {
        ProjectRollupStatus::Missing
    } else if running_count > 0 {
        ProjectRollupStatus::Running
    } else {
        ProjectRollupStatus::Stopped
    };

    ProjectStatus {
        id: project.id,
        name: project.name.clone(),
        status,
        dev_host: project.dev_host.clone(),
        defined_services: defined_services_for(&project.project_dir),
        running_count,
    }
}

fn unregistered_project_statuses(
    registry_projects: &[Project],
    inventory: &Inventory,
) -> Vec<ProjectStatus> {
    let known: std::collections::BTreeSet<&str> =
        registry_projects.iter().map(|p| p.name.as_str()).collect();
    inventory
        .projects
        .iter()
        .filter(|(label, _)| !known.contains(label.as_str()))
        .map(|(label, _)| ProjectStatus {
            id: hack_core::ProjectId::from_string(format!("prj-unreg-{label}")),
            name: label.clone(),
            status: ProjectRollupStatus::Unregistered,
            dev_host: None,
            defined_services: Vec::new(),
            running_count: inventory.running_count(label),
        })
        .collect()
}

fn exposure_statuses(config: &GatewayConfig, daemon_running: bool) -> Vec<ExposureStatus> {
    config
        .exposures
        .iter()
        .map(|exposure| {
            let signals = ExposureSignals {
                extension_enabled: exposure.enabled,
                dependencies_present: exposure
                    .dependency_binary
                    .as_deref()
                    .map(binary_on_path)
                    .unwrap_or(true),
                minimal_config_present: config.bind.is_some(),
                daemon_running,
                bind_satisfies_exposure: bind_satisfies(config.bind.as_deref(), exposure.requires_public_bind),
                dependency_missing: exposure
                    .dependency_binary
                    .as_deref()
                    .map(|b| !binary_on_path(b))
                    .unwrap_or(false),
                dependency_malformed: false,
            };
            ExposureStatus { kind: exposure.kind, state: signals.resolve() }
        })
        .collect()
}

fn binary_on_path(name: &str) -> bool {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| dir.join(name).is_file()))
        .unwrap_or(false)
}

/// Compose a [`StatusSnapshot`] from pre-gathered inputs. Each call
/// increments the process-wide snapshot version (spec §3: "each generation
/// increments `version`").
pub fn reconcile(inputs: ReconcileInputs<'_>) -> StatusSnapshot {
    let mut projects: Vec<ProjectStatus> =
        inputs.registry_projects.iter().map(|p| project_status(p, inputs.inventory)).collect();
    if inputs.include_unregistered {
        projects.extend(unregistered_project_statuses(inputs.registry_projects, inputs.inventory));
    }
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    // spec §4.F item 3: runtimeOk is false when the inventory reports
    // RuntimeUnavailable OR the reverse-proxy probe errors.
    let runtime_ok = inputs.runtime_reachable && inputs.reverse_proxy_ok;
    let runtime = RuntimeStatus {
        ok: runtime_ok,
        last_checked_at: inputs.now,
        last_ok_at: inputs.runtime_counters.last_ok_at,
        reset_at: inputs.runtime_counters.reset_at,
        reset_count: inputs.runtime_counters.reset_count,
        error_text: if runtime_ok {
            None
        } else if !inputs.runtime_reachable {
            Some("container runtime unavailable".to_string())
        } else {
            Some("reverse proxy probe failed".to_string())
        },
    };

    let gateway = GatewayStatus {
        enabled: inputs.gateway_config.enabled,
        bind: inputs.gateway_config.bind.clone(),
        port: inputs.gateway_config.port,
        allow_writes: inputs.gateway_config.allow_writes,
        exposures: exposure_statuses(inputs.gateway_config, inputs.daemon_running),
        active_token_count: inputs.active_token_count,
        revoked_token_count: inputs.revoked_token_count,
    };

    let summary = SubsystemSummary::new(runtime_ok, inputs.reverse_proxy_ok, inputs.logging_ok, inputs.network_ok);

    StatusSnapshot {
        version: SNAPSHOT_VERSION.fetch_add(1, Ordering::Relaxed) + 1,
        generated_at: inputs.now,
        daemon: inputs.daemon,
        runtime,
        projects,
        gateway,
        summary,
    }
}

/// Fold raw probe outcomes into the `ok` booleans the reconciler expects,
/// per the reverse-proxy/logging/network subsystem flags (spec §4.F item 5).
pub fn probes_all_ok<'a>(results: impl IntoIterator<Item = &'a ProbeOutcome>) -> bool {
    results.into_iter().all(|o| !matches!(o, ProbeOutcome::Error))
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
