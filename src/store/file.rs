use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use super::error::StoreError;
use crate::traits::RosterStore;
use crate::types::Roster;

/// File-based roster store.
/// Keeps the roster as a JSON array of members in a single file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RosterStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Roster> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "File store: {:?} does not exist yet, starting from default roster",
                    self.path
                );
                return Ok(Roster::seeded());
            }
            Err(e) => return Err(StoreError::Io(e).into()),
        };

        let roster: Roster = serde_json::from_slice(&bytes).map_err(StoreError::Json)?;
        tracing::debug!(
            "File store: loaded {} members from {:?}",
            roster.len(),
            self.path
        );
        Ok(roster)
    }

    async fn save(&self, roster: &Roster) -> Result<()> {
        let json = serde_json::to_vec_pretty(roster).map_err(StoreError::Json)?;

        // Write beside the target then rename so readers never see a partial file.
        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(StoreError::Io)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(StoreError::Io)?;

        tracing::debug!(
            "File store: wrote {} members to {:?}",
            roster.len(),
            self.path
        );
        Ok(())
    }

    async fn open(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StoreError::Io)?;
            }
        }
        tracing::info!("File store: using {:?}", self.path);
        Ok(())
    }
}
