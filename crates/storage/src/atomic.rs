// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic-rename JSON persistence shared by the registry and token stores
//! (spec §5 "Shared resources": "atomic replace on disk ensures external
//! readers never observe partial writes").

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreIoError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("malformed json in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

/// Write `value` to `path` via a same-directory temp file followed by
/// `rename`, so a concurrent reader never observes a partial document
/// (spec §8 property 5).
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreIoError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_name = format!(
        ".{}.tmp.{}",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("store"),
        std::process::id()
    );
    let tmp_path = dir.join(tmp_name);
    let body = serde_json::to_vec_pretty(value)
        .map_err(|source| StoreIoError::Json { path: path.to_path_buf(), source })?;
    fs::write(&tmp_path, &body).map_err(|source| StoreIoError::Io { path: tmp_path.clone(), source })?;
    fs::rename(&tmp_path, path).map_err(|source| StoreIoError::Io { path: path.to_path_buf(), source })?;
    Ok(())
}

/// Back up a corrupt file with a `.bak` suffix (rotating any prior backup
/// out of the way), mirroring the rotation discipline in the daemon's
/// snapshot store.
pub fn back_up_corrupt(path: &Path) {
    let bak = path.with_extension(
        path.extension().map(|e| format!("{}.bak", e.to_string_lossy())).unwrap_or_else(|| "bak".to_string()),
    );
    if bak.exists() {
        let _ = fs::remove_file(&bak);
    }
    if let Err(err) = fs::copy(path, &bak) {
        tracing::warn!(path = %path.display(), error = %err, "failed to back up corrupt store file");
    }
}

/// Load `path` as JSON, returning `None` if it does not exist yet (treated
/// as empty per spec §8 boundary case). A corrupt file is backed up and
/// `None` is returned so the caller can reset to an empty document.
pub fn load_or_reset<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read store file");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "store file is corrupt, resetting");
            back_up_corrupt(path);
            None
        }
    }
}
