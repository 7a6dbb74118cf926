// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/metrics` response body (spec §4.H): request totals, last-status
//! timings, queue depths.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub requests_total_by_path: BTreeMap<String, u64>,
    pub last_status_generation_ms: u64,
    pub log_reader_queue_depths: BTreeMap<String, usize>,
}
