//! Shared vault handle and clocks
//!
//! `VaultHandle` serializes writers behind a write lock and gives readers a
//! consistent view under the read lock. Closures run with the lock held and
//! must not block.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use vault::ledger::LedgerSnapshot;
use vault::vault::Vault;

use crate::errors::MonitorError;

#[derive(Debug, Clone)]
pub struct VaultHandle {
    inner: Arc<RwLock<Vault>>,
}

impl VaultHandle {
    pub fn new(vault: Vault) -> Self {
        Self {
            inner: Arc::new(RwLock::new(vault)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&Vault) -> R) -> Result<R, MonitorError> {
        let guard = self.inner.read().map_err(|_| MonitorError::LockPoisoned)?;
        Ok(f(&*guard))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Vault) -> R) -> Result<R, MonitorError> {
        let mut guard = self.inner.write().map_err(|_| MonitorError::LockPoisoned)?;
        Ok(f(&mut *guard))
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, MonitorError> {
        self.read(|vault| vault.snapshot())
    }
}

/// Source of the current time in seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for tests and simulation
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) -> u64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
