//! Bearer token lifecycle
//!
//! One opaque credential at a time: absent until a successful login or
//! signup sets it, cleared on explicit logout or the first 401. The
//! transport reads it at the start of each request; writers serialize
//! through the transport and the login/logout flow.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur while persisting the token
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// Writing the token to persistent storage failed
    #[error("Failed to persist token: {0}")]
    Persist(String),
}

/// Store for the single bearer credential
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token, or absent. Loads from persistent storage on first
    /// call and serves the cached value afterward; read failures are
    /// logged and treated as absent.
    async fn get(&self) -> Option<SecretString>;

    /// Persist and cache a new token.
    async fn set(&self, token: &str) -> Result<(), TokenStoreError>;

    /// Erase the persisted and cached token. Idempotent and best-effort:
    /// a failure to remove the backing file is logged, the cached value
    /// is gone regardless.
    async fn clear(&self);
}

#[derive(Debug, Clone)]
enum CacheState {
    Unloaded,
    Loaded(Option<SecretString>),
}

/// Token store backed by a single file on disk
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cache: RwLock<CacheState>,
}

impl FileTokenStore {
    /// Create a store persisting to the given path. The file is only
    /// read on the first `get`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(CacheState::Unloaded),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> Option<SecretString> {
        {
            let cache = self.cache.read();
            if let CacheState::Loaded(token) = &*cache {
                return token.clone();
            }
        }

        let loaded = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(SecretString::from(token.to_owned()))
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "Failed to read persisted token");
                None
            },
        };

        let mut cache = self.cache.write();
        // A set() or clear() that raced the load wins over the file read.
        if let CacheState::Loaded(token) = &*cache {
            return token.clone();
        }
        *cache = CacheState::Loaded(loaded.clone());
        loaded
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|err| TokenStoreError::Persist(err.to_string()))?;
        *self.cache.write() = CacheState::Loaded(Some(SecretString::from(token.to_owned())));
        debug!("Auth token persisted");
        Ok(())
    }

    async fn clear(&self) {
        *self.cache.write() = CacheState::Loaded(None);
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!("Auth token cleared"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
            Err(err) => {
                warn!(error = %err, path = %self.path.display(), "Failed to remove persisted token");
            },
        }
    }
}

/// In-memory token store, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Option<SecretString> {
        self.token.read().clone()
    }

    async fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.token.write() = Some(SecretString::from(token.to_owned()));
        Ok(())
    }

    async fn clear(&self) {
        *self.token.write() = None;
    }
}
