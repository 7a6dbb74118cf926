// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hack_core::{DaemonReadiness, ProjectContext, ProjectId};
use std::path::PathBuf;

fn sample_project(dir: &std::path::Path, name: &str) -> Project {
    let project_dir = dir.join(name);
    std::fs::create_dir_all(&project_dir).unwrap();
    let ctx = ProjectContext {
        repo_root: dir.join(format!("{name}-repo")),
        project_dir: project_dir.clone(),
        name: Some(name.to_string()),
        dev_host: None,
        config_fingerprint: None,
    };
    let now = Utc::now();
    Project {
        id: ProjectId::new(),
        name: ctx.candidate_slug(),
        repo_root: ctx.repo_root,
        project_dir: ctx.project_dir,
        dev_host: None,
        config_fingerprint: None,
        first_seen_at: now,
        last_seen_at: now,
    }
}

fn daemon_status() -> DaemonStatus {
    DaemonStatus {
        pid: Some(1234),
        readiness: DaemonReadiness::Running,
        pid_file_exists: true,
        socket_exists: true,
        stale_reason: None,
    }
}

#[test]
fn summary_ok_reflects_all_subsystems() {
    let dir = tempfile::tempdir().unwrap();
    let project = sample_project(dir.path(), "demo");
    let inventory = Inventory::default();
    let gateway_config = GatewayConfig::default();

    let snapshot = reconcile(ReconcileInputs {
        now: Utc::now(),
        daemon: daemon_status(),
        registry_projects: std::slice::from_ref(&project),
        inventory: &inventory,
        include_unregistered: false,
        runtime_reachable: true,
        reverse_proxy_ok: true,
        logging_ok: true,
        network_ok: false,
        runtime_counters: RuntimeHealthCounters::default(),
        gateway_config: &gateway_config,
        daemon_running: true,
        active_token_count: 0,
        revoked_token_count: 0,
    });

    assert!(!snapshot.summary.ok, "network_ok=false must drag summary.ok down (S1)");
    assert_eq!(snapshot.projects.len(), 1);
    assert_eq!(snapshot.projects[0].status, ProjectRollupStatus::Stopped);
}

#[test]
fn missing_project_dir_is_reported_as_missing() {
    let dir = tempfile::tempdir().unwrap();
    let mut project = sample_project(dir.path(), "demo");
    std::fs::remove_dir(&project.project_dir).unwrap();
    project.project_dir = dir.path().join("nonexistent");

    let inventory = Inventory::default();
    let gateway_config = GatewayConfig::default();
    let snapshot = reconcile(ReconcileInputs {
        now: Utc::now(),
        daemon: daemon_status(),
        registry_projects: std::slice::from_ref(&project),
        inventory: &inventory,
        include_unregistered: false,
        runtime_reachable: true,
        reverse_proxy_ok: true,
        logging_ok: true,
        network_ok: true,
        runtime_counters: RuntimeHealthCounters::default(),
        gateway_config: &gateway_config,
        daemon_running: true,
        active_token_count: 0,
        revoked_token_count: 0,
    });

    assert_eq!(snapshot.projects[0].status, ProjectRollupStatus::Missing);
}

#[test]
fn snapshot_version_increments_monotonically() {
    let dir = tempfile::tempdir().unwrap();
    let project = sample_project(dir.path(), "demo");
    let inventory = Inventory::default();
    let gateway_config = GatewayConfig::default();

    let make = || {
        reconcile(ReconcileInputs {
            now: Utc::now(),
            daemon: daemon_status(),
            registry_projects: std::slice::from_ref(&project),
            inventory: &inventory,
            include_unregistered: false,
            runtime_reachable: true,
            reverse_proxy_ok: true,
            logging_ok: true,
            network_ok: true,
            runtime_counters: RuntimeHealthCounters::default(),
            gateway_config: &gateway_config,
            daemon_running: true,
            active_token_count: 0,
            revoked_token_count: 0,
        })
    };

    let first = make();
    let second = make();
    assert!(second.version > first.version);
}

#[test]
fn unregistered_projects_are_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    let mut inventory = Inventory::default();
    inventory.projects.insert(
        "wild".to_string(),
        hack_adapters::ProjectInventory { working_dir: Some(PathBuf::from("/tmp/wild")), services: Default::default() },
    );
    let gateway_config = GatewayConfig::default();

    let without = reconcile(ReconcileInputs {
        now: Utc::now(),
        daemon: daemon_status(),
        registry_projects: &[],
        inventory: &inventory,
        include_unregistered: false,
        runtime_reachable: true,
        reverse_proxy_ok: true,
        logging_ok: true,
        network_ok: true,
        runtime_counters: RuntimeHealthCounters::default(),
        gateway_config: &gateway_config,
        daemon_running: true,
        active_token_count: 0,
        revoked_token_count: 0,
    });
    assert!(without.projects.is_empty());

    let with = reconcile(ReconcileInputs {
        now: Utc::now(),
        daemon: daemon_status(),
        registry_projects: &[],
        inventory: &inventory,
        include_unregistered: true,
        runtime_reachable: true,
        reverse_proxy_ok: true,
        logging_ok: true,
        network_ok: true,
        runtime_counters: RuntimeHealthCounters::default(),
        gateway_config: &gateway_config,
        daemon_running: true,
        active_token_count: 0,
        revoked_token_count: 0,
    });
    assert_eq!(with.projects.len(), 1);
    assert_eq!(with.projects[0].status, ProjectRollupStatus::Unregistered);
    let _ = dir;
}
