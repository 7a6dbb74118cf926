// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hack-adapters: container runtime shell-outs and health probes (spec
//! §4.D, §4.E).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod probes;
pub mod runtime;

pub use probes::{
    probe_binary_available, probe_dns_resolves, probe_file_exists, probe_network_exists,
    probe_runtime_reachability, probe_tcp_reachable, ProbeOutcome, ProbeResult, DEFAULT_PROBE_TIMEOUT,
    MAX_PROBE_TIMEOUT,
};
pub use runtime::{gather_inventory, Inventory, ProjectInventory, RuntimeUnavailable};
