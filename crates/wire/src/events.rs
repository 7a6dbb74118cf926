// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelopes streamed over `/v1/events` (spec §4.H, design note on the
//! pull-model snapshot + push "changed" notification).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StatusEvent {
    Changed { version: u64 },
}
