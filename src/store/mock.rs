use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::StoreError;
use crate::traits::RosterStore;
use crate::types::Roster;

/// Mock roster store for testing.
/// Keeps the roster in memory and can be told to fail loads, saves or health checks.
#[derive(Clone)]
pub struct MockRosterStore {
    pub roster: Arc<Mutex<Roster>>,
    fail_load: Arc<AtomicBool>,
    fail_save: Arc<AtomicBool>,
    unhealthy: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MockRosterStore {
    pub fn new() -> Self {
        Self::with_roster(Roster::seeded())
    }

    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Arc::new(Mutex::new(roster)),
            fail_load: Arc::new(AtomicBool::new(false)),
            fail_save: Arc::new(AtomicBool::new(false)),
            unhealthy: Arc::new(AtomicBool::new(false)),
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of what the store currently holds.
    pub async fn stored(&self) -> Roster {
        self.roster.lock().await.clone()
    }
}

impl Default for MockRosterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for MockRosterStore {
    fn name(&self) -> &'static str {
        "mock-roster-store"
    }

    async fn load(&self) -> Result<Roster> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("load").into());
        }
        Ok(self.roster.lock().await.clone())
    }

    async fn save(&self, roster: &Roster) -> Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("save").into());
        }
        *self.roster.lock().await = roster.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("MockRosterStore: saved {} members", roster.len());
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(StoreError::Injected("health_check").into());
        }
        Ok(())
    }
}
