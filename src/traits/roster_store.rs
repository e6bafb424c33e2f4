use anyhow::Result;
use async_trait::async_trait;

use crate::types::Roster;

/// Trait for roster persistence backends (memory, local file, remote table, etc.).
///
/// Implementations hold the canonical roster between sessions. The in-memory
/// roster owned by the caller stays authoritative; a failed `save` must never
/// be the reason a selection is lost.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Human-readable store name for logging.
    fn name(&self) -> &'static str;

    /// Load the stored roster.
    ///
    /// A backend holding nothing yet returns (and, where it can, stores) the
    /// seeded default roster.
    async fn load(&self) -> Result<Roster>;

    /// Replace the stored roster with `roster`.
    async fn save(&self, roster: &Roster) -> Result<()>;

    /// Cheap reachability check, run once at startup to choose a backend.
    async fn health_check(&self) -> Result<()> {
        // Default: always healthy
        Ok(())
    }

    /// Initialize the store (e.g., create directories, build clients).
    async fn open(&mut self) -> Result<()> {
        // Default: no-op
        Ok(())
    }

    /// Close/cleanup the store.
    async fn close(&mut self) -> Result<()> {
        // Default: no-op
        Ok(())
    }
}
