// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paths & Locks (spec §4.A): PID-file exclusivity and stale-state
//! detection, grounded on the lock-before-write startup sequencing this
//! teacher repo uses for its own daemon lifecycle.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("another hackd instance is already running (pid file locked)")]
    AlreadyRunning,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Holds the exclusive lock on `hackd.pid` for the life of the process.
/// Dropping it releases the OS lock; it does not remove the pid file itself,
/// matching the shutdown path's explicit cleanup (see `shutdown`).
pub struct PidLockGuard {
    file: File,
    pub pid_path: PathBuf,
    pub socket_path: PathBuf,
}

impl PidLockGuard {
    pub fn release_and_cleanup(self) {
        let _ = std::fs::remove_file(&self.pid_path);
        let _ = std::fs::remove_file(&self.socket_path);
        drop(self.file);
    }
}

/// Acquire the daemon's startup lock.
///
/// Order matters: the lock is taken on the pid file *before* it is
/// truncated or written, so a failed `try_lock_exclusive` never clobbers
/// the PID of whichever daemon is already holding it. Only after the lock
/// is ours do we overwrite the file and clear any stale socket.
pub fn acquire(config: &Config) -> Result<PidLockGuard, StartupError> {
    crate::config::ensure_state_root(&config.state_root)?;

    let lock_file = OpenOptions::new().read(true).write(true).create(true).truncate(false).open(&config.pid_path)?;
    lock_file.try_lock_exclusive().map_err(|_| StartupError::AlreadyRunning)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    std::io::Seek::seek(&mut lock_file, std::io::SeekFrom::Start(0))?;
    writeln!(lock_file, "{}", std::process::id())?;
    lock_file.sync_all()?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }

    Ok(PidLockGuard { file: lock_file, pid_path: config.pid_path.clone(), socket_path: config.socket_path.clone() })
}

/// Read the PID recorded in `hackd.pid`, if the file exists and parses.
pub fn read_pid(config: &Config) -> Option<u32> {
    std::fs::read_to_string(&config.pid_path).ok()?.trim().parse().ok()
}

/// True if a process with this pid appears to be alive, by sending signal 0.
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
pub fn process_alive(_pid: u32) -> bool {
    false
}

/// Stale-state detection (spec §4.A "stale"): a pid/socket pair is stale
/// when the recorded pid is no longer alive, regardless of which of the two
/// files still linger on disk.
pub fn is_stale(config: &Config) -> bool {
    match read_pid(config) {
        Some(pid) => !process_alive(pid),
        None => config.socket_path.exists(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_then_acquire_again_reports_already_running() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::under(dir.path());
        let guard = acquire(&config).unwrap();
        let second = OpenOptions::new().read(true).write(true).create(true).open(&config.pid_path).unwrap();
        assert!(second.try_lock_exclusive().is_err());
        guard.release_and_cleanup();
    }

    #[test]
    fn stale_when_pid_file_absent_but_socket_present() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::under(dir.path());
        std::fs::create_dir_all(&config.state_root).unwrap();
        std::fs::write(&config.socket_path, b"").unwrap();
        assert!(is_stale(&config));
    }
}
