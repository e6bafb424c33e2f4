use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::traits::RosterStore;
use crate::types::Roster;

/// Roster kept in process memory only. Starts from the seeded roster.
#[derive(Clone)]
pub struct MemoryStore {
    roster: Arc<Mutex<Roster>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_roster(Roster::seeded())
    }

    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster: Arc::new(Mutex::new(roster)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RosterStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Roster> {
        Ok(self.roster.lock().await.clone())
    }

    async fn save(&self, roster: &Roster) -> Result<()> {
        *self.roster.lock().await = roster.clone();
        tracing::debug!("MemoryStore: saved {} members", roster.len());
        Ok(())
    }
}
