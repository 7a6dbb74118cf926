// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `runtime-counters.json` sidecar (spec §4.F item 3, §6): the
//! false→true transition bookkeeping for the status reconciler's runtime
//! health flag, persisted independently of the registry/token documents.

use chrono::{DateTime, Utc};
use hack_core::RuntimeHealthCounters;
use parking_lot::Mutex;
use std::path::PathBuf;

use crate::atomic::{load_or_reset, StoreIoError};
use crate::registry::persist_with_retries;

pub struct RuntimeCountersStore {
    path: PathBuf,
    counters: Mutex<RuntimeHealthCounters>,
}

impl RuntimeCountersStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let counters = load_or_reset::<RuntimeHealthCounters>(&path).unwrap_or_default();
        Self { path, counters: Mutex::new(counters) }
    }

    pub fn current(&self) -> RuntimeHealthCounters {
        self.counters.lock().clone()
    }

    /// Record a fresh runtime-health observation, persisting the updated
    /// counters under the same atomic-rename discipline as the registry.
    pub fn observe(&self, ok: bool, now: DateTime<Utc>) -> Result<RuntimeHealthCounters, StoreIoError> {
        let mut counters = self.counters.lock();
        let updated = counters.observe(ok, now);
        persist_with_retries(&self.path, &updated)?;
        *counters = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_sidecar_starts_with_zero_resets() {
        let dir = tempdir().unwrap();
        let store = RuntimeCountersStore::open(dir.path().join("runtime-counters.json"));
        assert_eq!(store.current().reset_count, 0);
    }

    #[test]
    fn recovery_increments_reset_count_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runtime-counters.json");
        let now = Utc::now();
        {
            let store = RuntimeCountersStore::open(&path);
            store.observe(false, now).unwrap();
            store.observe(true, now).unwrap();
        }
        let reopened = RuntimeCountersStore::open(&path);
        assert_eq!(reopened.current().reset_count, 1);
    }
}
