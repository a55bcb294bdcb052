//! JSON-file backed profile store
//!
//! Stands in for the remote profile API: values are kept in one JSON document
//! per profile. I/O failures surface as transport errors.

use super::traits::ProfileStore;
use crate::error::{ServiceError, TransportError};
use crate::state::FormState;
use anyhow::anyhow;
use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default file name inside the store directory
const DEFAULT_FILE: &str = "qualifications.json";

/// Store for one profile's values
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under `dir`, or the platform data directory when None
    pub fn in_dir(dir: Option<&Path>) -> anyhow::Result<Self> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => ProjectDirs::from("io", "profile-forms", "profile-forms")
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or_else(|| anyhow!("No data directory available"))?,
        };
        Ok(Self::new(dir.join(DEFAULT_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn load(&self) -> Result<FormState, ServiceError> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!("No saved profile at {}", self.path.display());
            return Ok(FormState::default());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let state = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Corrupt profile file {}: {}", self.path.display(), e))?;
        Ok(state)
    }

    async fn save(&self, values: &FormState) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| anyhow!("Failed to encode profile: {}", e))?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| TransportError::new(format!("Failed to write profile: {}", e)))?;
        tracing::info!("Saved profile to {}", self.path.display());
        Ok(())
    }
}
