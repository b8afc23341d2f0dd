//! Daemon singleton lockfile (spec §11 supplement: only one scheduler loop
//! may run against a given config/state directory at a time).
//!
//! Grounded on `at_core::lockfile::DaemonLockfile`: `O_CREAT | O_EXCL` atomic
//! create, with PID-liveness staleness detection so a crashed process never
//! wedges future runs.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLock {
    pub pid: u32,
    pub started_at: String,
    pub version: String,
}

pub enum AcquireResult {
    Acquired,
    AlreadyRunning(RunLock),
    StaleRemoved,
}

impl RunLock {
    pub fn path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".issue-scout")
            .join("scout.lock")
    }

    pub fn current(version: impl Into<String>) -> Self {
        Self {
            pid: std::process::id(),
            started_at: chrono::Utc::now().to_rfc3339(),
            version: version.into(),
        }
    }

    pub fn acquire(&self) -> std::io::Result<AcquireResult> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let json = serde_json::to_string_pretty(self)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                Ok(AcquireResult::Acquired)
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => match Self::read() {
                Some(existing) if existing.is_alive() => Ok(AcquireResult::AlreadyRunning(existing)),
                _ => {
                    tracing::info!("removing stale run lockfile");
                    Self::remove();
                    Ok(AcquireResult::StaleRemoved)
                }
            },
            Err(e) => Err(e),
        }
    }

    pub fn acquire_or_fail(&self) -> Result<(), String> {
        for attempt in 0..2 {
            match self.acquire() {
                Ok(AcquireResult::Acquired) => return Ok(()),
                Ok(AcquireResult::AlreadyRunning(existing)) => {
                    return Err(format!(
                        "issue-scout already running (pid={}, started_at={})",
                        existing.pid, existing.started_at
                    ));
                }
                Ok(AcquireResult::StaleRemoved) if attempt == 0 => {
                    tracing::info!("stale lockfile removed, retrying acquire");
                    continue;
                }
                Ok(AcquireResult::StaleRemoved) => {
                    return Err("failed to acquire lockfile after stale cleanup".into());
                }
                Err(e) => return Err(format!("lockfile I/O error: {e}")),
            }
        }
        Err("lockfile acquire failed".into())
    }

    pub fn read() -> Option<Self> {
        let path = Self::path();
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn remove() {
        let _ = std::fs::remove_file(Self::path());
    }

    pub fn is_alive(&self) -> bool {
        pid_alive(self.pid)
    }

    pub fn read_valid() -> Option<Self> {
        let lock = Self::read()?;
        if lock.is_alive() {
            Some(lock)
        } else {
            tracing::info!(pid = lock.pid, "removing stale run lockfile (process not running)");
            Self::remove();
            None
        }
    }
}

#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    // SAFETY: signal 0 checks existence, sends nothing.
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_pid_is_alive() {
        assert!(pid_alive(std::process::id()));
    }

    #[test]
    fn bogus_pid_is_dead() {
        assert!(!pid_alive(4_000_000));
    }

    #[test]
    fn lock_roundtrip() {
        let lock = RunLock::current("0.1.0");
        let json = serde_json::to_string_pretty(&lock).unwrap();
        let parsed: RunLock = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pid, lock.pid);
        assert!(parsed.is_alive());
    }
}
