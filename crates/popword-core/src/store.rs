use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use popword_config::Preferences;
use tokio::sync::RwLock;

/// Where user preferences live. Read once per request, never cached.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<Preferences, StoreError>;

    async fn save(&self, preferences: &Preferences) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Default)]
pub struct MemoryConfigStore {
    preferences: RwLock<Preferences>,
}

impl MemoryConfigStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences: RwLock::new(preferences),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Preferences, StoreError> {
        Ok(self.preferences.read().await.clone())
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), StoreError> {
        *self.preferences.write().await = preferences.clone();
        Ok(())
    }
}

/// Preferences kept as a JSON object using the extension's storage keys
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> Result<Preferences, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} missing, using default preferences", self.path.display());
                Ok(Preferences::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_string_pretty(preferences)?;
        tokio::fs::write(&self.path, raw).await?;
        tracing::info!("saved preferences to {}", self.path.display());
        Ok(())
    }
}
