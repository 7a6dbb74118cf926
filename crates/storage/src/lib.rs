// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hack-storage: atomic-rename JSON persistence for the project registry,
//! gateway tokens, and the runtime-health sidecar (spec §4.B, §4.C, §4.F).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod atomic;
pub mod registry;
pub mod runtime_counters;
pub mod tokens;

pub use atomic::StoreIoError;
pub use registry::{RegistryError, RegistryStore, UpsertOutcome};
pub use runtime_counters::RuntimeCountersStore;
pub use tokens::{MintedToken, TokenError, TokenStore};
