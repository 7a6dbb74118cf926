// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The IO-gathering half of the Status Reconciler (spec §4.F item 1): runs
//! the container inventory and health probes concurrently under a 3s
//! overall budget, then hands the results to `hack_status::reconcile`.

use std::time::Duration;

use hack_adapters::{probe_file_exists, probe_network_exists, Inventory, ProbeOutcome, DEFAULT_PROBE_TIMEOUT};
use hack_core::{Clock, DaemonReadiness, DaemonStatus, StatusSnapshot};
use hack_status::{reconcile, ReconcileInputs};

use crate::server::AppState;

const GATHER_BUDGET: Duration = Duration::from_secs(3);

fn probe_is_ok(outcome: ProbeOutcome) -> bool {
    !matches!(outcome, ProbeOutcome::Error)
}

struct GatherResults {
    inventory: Inventory,
    runtime_reachable: bool,
    reverse_proxy_ok: bool,
    logging_ok: bool,
    network_ok: bool,
}

async fn gather<C: Clock + 'static>(state: &AppState<C>) -> GatherResults {
    let inventory_result = hack_adapters::gather_inventory(&state.config.state_root, false).await;
    let runtime_reachable = inventory_result.is_ok();
    let inventory = inventory_result.unwrap_or_default();

    let reverse_proxy = probe_file_exists(&state.config.state_root.join("Caddyfile"), DEFAULT_PROBE_TIMEOUT).await;
    let logging = probe_file_exists(&state.config.log_path, DEFAULT_PROBE_TIMEOUT).await;
    let network = probe_network_exists("hack", None, DEFAULT_PROBE_TIMEOUT).await;

    GatherResults {
        inventory,
        runtime_reachable,
        reverse_proxy_ok: probe_is_ok(reverse_proxy.status),
        logging_ok: probe_is_ok(logging.status),
        network_ok: probe_is_ok(network.status),
    }
}

fn daemon_status<C: Clock + 'static>(state: &AppState<C>) -> DaemonStatus {
    DaemonStatus {
        pid: Some(std::process::id()),
        readiness: DaemonReadiness::Running,
        pid_file_exists: state.config.pid_path.exists(),
        socket_exists: state.config.socket_path.exists(),
        stale_reason: None,
    }
}

/// Gather fresh subsystem data and compose a [`StatusSnapshot`] (spec
/// §4.F). A gather that overruns the budget degrades every subsystem flag
/// to `false` rather than blocking the caller indefinitely.
pub async fn gather_snapshot<C: Clock + 'static>(state: &AppState<C>) -> StatusSnapshot {
    let now = state.clock.utc_now();
    let results = match tokio::time::timeout(GATHER_BUDGET, gather(state)).await {
        Ok(r) => r,
        Err(_) => GatherResults {
            inventory: Inventory::default(),
            runtime_reachable: false,
            reverse_proxy_ok: false,
            logging_ok: false,
            network_ok: false,
        },
    };

    // spec §4.F item 3: the runtime is only "ok" when both the container
    // runtime is reachable and the reverse-proxy probe isn't erroring.
    let runtime_ok = results.runtime_reachable && results.reverse_proxy_ok;
    let runtime_counters = state.runtime_counters.observe(runtime_ok, now).unwrap_or_default();
    let registry_projects = state.registry.list();
    let gateway_config = state.gateway_config.read().clone();
    let tokens = state.tokens.list();
    let active_token_count = tokens.iter().filter(|t| t.revoked_at.is_none()).count() as u64;
    let revoked_token_count = tokens.len() as u64 - active_token_count;

    reconcile(ReconcileInputs {
        now,
        daemon: daemon_status(state),
        registry_projects: &registry_projects,
        inventory: &results.inventory,
        include_unregistered: false,
        runtime_reachable: results.runtime_reachable,
        reverse_proxy_ok: results.reverse_proxy_ok,
        logging_ok: results.logging_ok,
        network_ok: results.network_ok,
        runtime_counters,
        gateway_config: &gateway_config,
        daemon_running: true,
        active_token_count,
        revoked_token_count,
    })
}
