use anyhow::bail;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default table the remote store reads and writes.
pub const DEFAULT_TABLE: &str = "team_members";

/// Session used by the remote store when none is configured.
pub const DEFAULT_SESSION: &str = "default";

/// Which roster store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Memory,
    File,
    Remote,
}

/// Backend selection plus its connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Roster lives only in process memory.
    Memory,

    /// JSON file on local disk.
    File { path: String },

    /// REST table (PostgREST dialect) scoped by session.
    Remote {
        url: String,
        api_key: String,
        table: String,
        session_id: String,
    },
}

impl StorageConfig {
    pub fn storage_type(&self) -> StorageType {
        match self {
            StorageConfig::Memory => StorageType::Memory,
            StorageConfig::File { .. } => StorageType::File,
            StorageConfig::Remote { .. } => StorageType::Remote,
        }
    }

    /// Check that the selected backend has what it needs to connect.
    pub fn validate(&self) -> Result<()> {
        match self {
            StorageConfig::Memory => Ok(()),
            StorageConfig::File { path } => {
                if path.trim().is_empty() {
                    bail!("file storage requires a path");
                }
                Ok(())
            }
            StorageConfig::Remote {
                url,
                api_key,
                table,
                session_id,
            } => {
                if url.trim().is_empty() || api_key.trim().is_empty() {
                    bail!("remote storage requires both a URL and an API key");
                }
                if table.trim().is_empty() {
                    bail!("remote storage requires a table name");
                }
                if session_id.trim().is_empty() {
                    bail!("remote storage requires a session id");
                }
                Ok(())
            }
        }
    }
}

/// Base configuration for the app.
/// The CLI in `main.rs` builds this from parsed arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Roster store backend.
    pub storage: StorageConfig,

    /// Length of the cosmetic spin before a result is revealed.
    pub spin_millis: u64,

    /// Whether a remote store that fails its startup check is replaced by the
    /// file store at `local_path`.
    pub fallback_to_local: bool,

    /// File used when falling back from the remote store.
    pub local_path: String,
}

impl Default for BaseConfig {
    fn default() -> Self {
        BaseConfig {
            storage: StorageConfig::File {
                path: "./data/roster.json".to_string(),
            },
            spin_millis: 2000,
            fallback_to_local: true,
            local_path: "./data/roster.json".to_string(),
        }
    }
}
