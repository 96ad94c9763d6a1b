//! Fallback identity store.
//!
//! DESIGN
//! ======
//! A best-effort mirror of the last identity the provider confirmed for each
//! device. It is written whenever the provider confirms a session, cleared on
//! sign-out, and read only when the provider cannot answer. Entries are plain
//! JSON with no expiry and no versioning; the provider stays authoritative.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::device::DeviceId;
use crate::provider::Identity;

const FILE_PREFIX: &str = "jobswipe-user-";

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("fallback store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fallback store encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait FallbackStore: Send + Sync {
    async fn set(&self, device: DeviceId, identity: &Identity) -> Result<(), FallbackError>;
    async fn get(&self, device: DeviceId) -> Result<Option<Identity>, FallbackError>;
    async fn clear(&self, device: DeviceId) -> Result<(), FallbackError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Default)]
pub struct MemoryFallbackStore {
    entries: RwLock<HashMap<DeviceId, Identity>>,
}

impl MemoryFallbackStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FallbackStore for MemoryFallbackStore {
    async fn set(&self, device: DeviceId, identity: &Identity) -> Result<(), FallbackError> {
        self.entries
            .write()
            .await
            .insert(device, identity.clone());
        Ok(())
    }

    async fn get(&self, device: DeviceId) -> Result<Option<Identity>, FallbackError> {
        Ok(self.entries.read().await.get(&device).cloned())
    }

    async fn clear(&self, device: DeviceId) -> Result<(), FallbackError> {
        self.entries.write().await.remove(&device);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// One JSON file per device under a directory.
pub struct FileFallbackStore {
    dir: PathBuf,
}

impl FileFallbackStore {
    /// Open (and create if needed) the store directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, FallbackError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, device: DeviceId) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{device}.json"))
    }
}

#[async_trait::async_trait]
impl FallbackStore for FileFallbackStore {
    async fn set(&self, device: DeviceId, identity: &Identity) -> Result<(), FallbackError> {
        let bytes = serde_json::to_vec(identity)?;
        let path = self.path_for(device);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, device: DeviceId) -> Result<Option<Identity>, FallbackError> {
        let path = self.path_for(device);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                tracing::warn!(%device, error = %e, "discarding unreadable fallback identity");
                Ok(None)
            }
        }
    }

    async fn clear(&self, device: DeviceId) -> Result<(), FallbackError> {
        match tokio::fs::remove_file(self.path_for(device)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// BEST-EFFORT HELPERS
// =============================================================================

/// Write `identity` for `device`, logging instead of failing.
pub async fn remember(store: &dyn FallbackStore, device: DeviceId, identity: &Identity) {
    if let Err(e) = store.set(device, identity).await {
        tracing::warn!(%device, error = %e, "fallback identity write failed");
    }
}

/// Read the cached identity for `device`; errors read as "nothing cached".
pub async fn recall(store: &dyn FallbackStore, device: DeviceId) -> Option<Identity> {
    match store.get(device).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(%device, error = %e, "fallback identity read failed");
            None
        }
    }
}

/// Drop the cached identity for `device`, logging instead of failing.
pub async fn forget(store: &dyn FallbackStore, device: DeviceId) {
    if let Err(e) = store.clear(device).await {
        tracing::warn!(%device, error = %e, "fallback identity clear failed");
    }
}

#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;
