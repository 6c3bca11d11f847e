use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::auth::repo_types::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("users file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("users file {path} is not a valid user list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize user list: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Whole-collection persistence for user records.
///
/// `load` always returns the full list and `save` always replaces it; there is
/// no per-record access. Callers that mutate must serialize load/save pairs
/// themselves.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load(&self) -> Result<Vec<User>, StoreError>;
    async fn save(&self, users: &[User]) -> Result<(), StoreError>;
}

/// Users kept in a single pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the document as an empty array if it does not exist yet.
    ///
    /// Never replaces an existing document, even one that appears after the
    /// existence check.
    pub async fn init(&self) -> Result<(), StoreError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io(e))?;
        if exists {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io(e))?;
        }
        if self.write_atomic(b"[]".to_vec(), Replace::No).await? {
            info!(path = %self.path.display(), "initialized empty users file");
        }
        Ok(())
    }

    /// Writes `bytes` to a uniquely named sibling temp file and moves it into
    /// place. Returns `false` when `Replace::No` found the target already there.
    async fn write_atomic(&self, bytes: Vec<u8>, replace: Replace) -> Result<bool, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_via_temp(&path, &bytes, replace))
            .await
            .map_err(|e| self.io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
            .map_err(|e| self.io(e))
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<User>, StoreError> {
        self.init().await?;
        let raw = tokio::fs::read(&self.path).await.map_err(|e| self.io(e))?;
        let users: Vec<User> = serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(count = users.len(), "users loaded");
        Ok(users)
    }

    async fn save(&self, users: &[User]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(users).map_err(StoreError::Serialize)?;
        self.write_atomic(body, Replace::Yes).await?;
        debug!(count = users.len(), "users saved");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replace {
    Yes,
    No,
}

fn write_via_temp(path: &Path, bytes: &[u8], replace: Replace) -> std::io::Result<bool> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    match replace {
        Replace::Yes => {
            tmp.persist(path).map_err(|e| e.error)?;
            Ok(true)
        }
        Replace::No => match tmp.persist_noclobber(path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error),
        },
    }
}

/// In-process store used by tests and `AppState::fake`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn save(&self, users: &[User]) -> Result<(), StoreError> {
        *self.users.write().await = users.to_vec();
        Ok(())
    }
}
