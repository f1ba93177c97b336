use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{domain::SessionBlob, errors::Error, Result};

/// Durable home of the single session blob.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn exists(&self) -> bool;
    async fn load(&self) -> Result<SessionBlob>;
    /// Overwrites whatever was stored before.
    async fn save(&self, session: &SessionBlob) -> Result<()>;
}

/// Session blob kept verbatim in a text file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, source: std::io::Error) -> Error {
        Error::Storage {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn load(&self) -> Result<SessionBlob> {
        let txt = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.storage_err(e))?;
        Ok(SessionBlob(txt))
    }

    async fn save(&self, session: &SessionBlob) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.storage_err(e))?;
        }
        tokio::fs::write(&self.path, session.as_str())
            .await
            .map_err(|e| self.storage_err(e))
    }
}
