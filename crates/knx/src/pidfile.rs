// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! PID lockfile enforcing single-instance ownership of the routing daemon.
//!
//! The lock is taken once the child is running and released only after it
//! has exited; releasing earlier would let a second instance race into a
//! USB device the dying child still holds.

use crate::proc::{process_comm, process_exists};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Preferred lockfile location.
pub const PRIMARY_PID_PATH: &str = "/var/run/graylogic-knxd.pid";
/// Fallback when `/var/run` is not writable.
pub const FALLBACK_PID_PATH: &str = "/tmp/graylogic-knxd.pid";

/// Stale-file handling is retry-bounded so two crashing instances cannot
/// chase each other's deletions forever.
const MAX_ACQUIRE_ATTEMPTS: u32 = 3;

/// PID lockfile failures
#[derive(Debug, Error)]
pub enum PidLockError {
    #[error("another instance owns {path} (pid {pid})")]
    AlreadyRunning { path: PathBuf, pid: u32 },
    #[error("gave up acquiring {path} after {attempts} attempts")]
    Contended { path: PathBuf, attempts: u32 },
    #[error("io error on pid file: {0}")]
    Io(#[from] io::Error),
}

/// Held PID lockfile. The acquisition path is remembered so release works
/// even if directory permissions change underneath us.
#[derive(Debug)]
pub struct PidLock {
    path: PathBuf,
}

impl PidLock {
    /// Acquire the lock at the default location for `pid`.
    ///
    /// `expected_comm` is the kernel process name a live lock owner must
    /// have; anything else marks the file stale.
    pub fn acquire(pid: u32, expected_comm: &str) -> Result<Self, PidLockError> {
        Self::acquire_at(default_path(), pid, expected_comm)
    }

    /// Acquire the lock at an explicit path.
    pub fn acquire_at(
        path: PathBuf,
        pid: u32,
        expected_comm: &str,
    ) -> Result<Self, PidLockError> {
        for _attempt in 0..MAX_ACQUIRE_ATTEMPTS {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .mode(0o600)
                .open(&path)
            {
                Ok(mut file) => {
                    writeln!(file, "{}", pid)?;
                    tracing::info!(path = %path.display(), pid, "pid lock acquired");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    match read_owner(&path) {
                        None => {
                            // Unreadable or non-numeric content
                            tracing::warn!(path = %path.display(), "removing malformed pid file");
                            remove_ignore_missing(&path)?;
                        }
                        Some(owner) if !process_exists(owner) => {
                            tracing::warn!(
                                path = %path.display(),
                                owner,
                                "removing stale pid file for dead process"
                            );
                            remove_ignore_missing(&path)?;
                        }
                        Some(owner) => match process_comm(owner) {
                            Ok(comm) if comm == expected_comm => {
                                return Err(PidLockError::AlreadyRunning { path, pid: owner });
                            }
                            _ => {
                                tracing::warn!(
                                    path = %path.display(),
                                    owner,
                                    "pid file owner is not {expected_comm}, removing"
                                );
                                remove_ignore_missing(&path)?;
                            }
                        },
                    }
                }
                Err(e) => return Err(PidLockError::Io(e)),
            }
        }
        Err(PidLockError::Contended {
            path,
            attempts: MAX_ACQUIRE_ATTEMPTS,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the lockfile. Call only after the child has exited.
    pub fn release(self) -> io::Result<()> {
        tracing::info!(path = %self.path.display(), "releasing pid lock");
        remove_ignore_missing(&self.path)
    }
}

/// Parse the owner PID out of an existing lockfile.
fn read_owner(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn remove_ignore_missing(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// `/var/run` when writable (typically root), `/tmp` otherwise.
fn default_path() -> PathBuf {
    let primary = Path::new(PRIMARY_PID_PATH);
    if primary
        .parent()
        .is_some_and(|dir| dir_writable(dir))
    {
        primary.to_path_buf()
    } else {
        PathBuf::from(FALLBACK_PID_PATH)
    }
}

fn dir_writable(dir: &Path) -> bool {
    let probe = dir.join(".graylogic-knxd.probe");
    match OpenOptions::new().write(true).create(true).open(&probe) {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
