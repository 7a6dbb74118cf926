// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process counters backing `/v1/metrics` (spec §4.H).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use hack_wire::MetricsResponse;
use parking_lot::Mutex;

#[derive(Default)]
pub struct Metrics {
    requests_total_by_path: Mutex<BTreeMap<String, u64>>,
    last_status_generation_ms: AtomicU64,
    log_reader_queue_depths: Mutex<BTreeMap<String, usize>>,
}

impl Metrics {
    pub fn record_request(&self, path: &str) {
        *self.requests_total_by_path.lock().entry(path.to_string()).or_insert(0) += 1;
    }

    pub fn record_status_generation(&self, millis: u64) {
        self.last_status_generation_ms.store(millis, Ordering::Relaxed);
    }

    pub fn set_log_queue_depth(&self, stream: &str, depth: usize) {
        self.log_reader_queue_depths.lock().insert(stream.to_string(), depth);
    }

    pub fn snapshot(&self) -> MetricsResponse {
        MetricsResponse {
            requests_total_by_path: self.requests_total_by_path.lock().clone(),
            last_status_generation_ms: self.last_status_generation_ms.load(Ordering::Relaxed),
            log_reader_queue_depths: self.log_reader_queue_depths.lock().clone(),
        }
    }
}
