// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hack-status: the Status Reconciler (spec §4.F) that composes the
//! registry, container inventory, and health probes into a `StatusSnapshot`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod gateway;
pub mod reconciler;

pub use gateway::{bind_satisfies, ExposureConfig, GatewayConfig};
pub use reconciler::{probes_all_ok, reconcile, ReconcileInputs};
