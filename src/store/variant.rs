use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use tracing::warn;

use super::file::FileStore;
use super::memory::MemoryStore;
use super::mock::MockRosterStore;
use super::remote::RemoteStore;
use crate::config::BaseConfig;
use crate::config::StorageConfig;
use crate::traits::RosterStore;
use crate::types::Roster;

/// Enum representing all possible roster store implementations.
pub enum RosterStoreVariant {
    Memory(MemoryStore),
    File(FileStore),
    Remote(RemoteStore),
    Mock(MockRosterStore),
}

impl RosterStoreVariant {
    /// Build the store named by `config`, unopened.
    pub fn from_config(config: &StorageConfig) -> Self {
        match config {
            StorageConfig::Memory => RosterStoreVariant::Memory(MemoryStore::new()),
            StorageConfig::File { path } => RosterStoreVariant::File(FileStore::new(path)),
            StorageConfig::Remote {
                url,
                api_key,
                table,
                session_id,
            } => RosterStoreVariant::Remote(RemoteStore::new(
                url.clone(),
                api_key.clone(),
                table.clone(),
                session_id.clone(),
            )),
        }
    }

    /// Pick and open the store for this run.
    ///
    /// The configured store is opened and health-checked once. When that fails and
    /// `fallback_to_local` is set, a remote store is replaced by the file store at
    /// `local_path`, and anything that still fails by the memory store.
    pub async fn resolve(config: &BaseConfig) -> Result<Self> {
        let mut candidates = Vec::new();

        match config.storage.validate() {
            Ok(()) => candidates.push(Self::from_config(&config.storage)),
            Err(e) if config.fallback_to_local => {
                warn!("Storage configuration rejected: {}", e);
            }
            Err(e) => return Err(e),
        }

        if config.fallback_to_local {
            if matches!(config.storage, StorageConfig::Remote { .. }) {
                candidates.push(RosterStoreVariant::File(FileStore::new(&config.local_path)));
            }
            if !matches!(config.storage, StorageConfig::Memory) {
                candidates.push(RosterStoreVariant::Memory(MemoryStore::new()));
            }
        }

        let mut last_err = None;
        for mut store in candidates {
            match store.open_checked().await {
                Ok(()) => {
                    info!("Using {} roster store", store.name());
                    return Ok(store);
                }
                Err(e) => {
                    warn!("Roster store {} unavailable: {}", store.name(), e);
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("no usable roster store")))
    }

    async fn open_checked(&mut self) -> Result<()> {
        self.open().await?;
        self.health_check().await
    }
}

#[async_trait]
impl RosterStore for RosterStoreVariant {
    fn name(&self) -> &'static str {
        match self {
            RosterStoreVariant::Memory(inner) => inner.name(),
            RosterStoreVariant::File(inner) => inner.name(),
            RosterStoreVariant::Remote(inner) => inner.name(),
            RosterStoreVariant::Mock(inner) => inner.name(),
        }
    }

    async fn load(&self) -> Result<Roster> {
        match self {
            RosterStoreVariant::Memory(inner) => inner.load().await,
            RosterStoreVariant::File(inner) => inner.load().await,
            RosterStoreVariant::Remote(inner) => inner.load().await,
            RosterStoreVariant::Mock(inner) => inner.load().await,
        }
    }

    async fn save(&self, roster: &Roster) -> Result<()> {
        match self {
            RosterStoreVariant::Memory(inner) => inner.save(roster).await,
            RosterStoreVariant::File(inner) => inner.save(roster).await,
            RosterStoreVariant::Remote(inner) => inner.save(roster).await,
            RosterStoreVariant::Mock(inner) => inner.save(roster).await,
        }
    }

    async fn health_check(&self) -> Result<()> {
        match self {
            RosterStoreVariant::Memory(inner) => inner.health_check().await,
            RosterStoreVariant::File(inner) => inner.health_check().await,
            RosterStoreVariant::Remote(inner) => inner.health_check().await,
            RosterStoreVariant::Mock(inner) => inner.health_check().await,
        }
    }

    async fn open(&mut self) -> Result<()> {
        match self {
            RosterStoreVariant::Memory(inner) => inner.open().await,
            RosterStoreVariant::File(inner) => inner.open().await,
            RosterStoreVariant::Remote(inner) => inner.open().await,
            RosterStoreVariant::Mock(inner) => inner.open().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            RosterStoreVariant::Memory(inner) => inner.close().await,
            RosterStoreVariant::File(inner) => inner.close().await,
            RosterStoreVariant::Remote(inner) => inner.close().await,
            RosterStoreVariant::Mock(inner) => inner.close().await,
        }
    }
}
