use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::AppResult;
use crate::models::MovieId;

use super::memory::MemoryStore;

/// Prefix shared by every metadata entry
pub const KEY_PREFIX: &str = "meta:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Poster(MovieId),
    Description(MovieId),
    Trailer(MovieId),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Poster(id) => write!(f, "poster:{}", id),
            CacheKey::Description(id) => write!(f, "description:{}", id),
            CacheKey::Trailer(id) => write!(f, "trailer:{}", id),
        }
    }
}

/// Backing storage for serialized cache entries
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores a value without waiting for the write to complete
    fn set(&self, key: String, value: String);

    /// Drops every metadata entry
    async fn clear(&self) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

/// Read-through metadata cache keyed by movie id and field
///
/// Entries never expire on their own. `invalidate` is called whenever the
/// catalog is reloaded: it bumps the generation embedded in every storage key.
/// Read-through callers pin the generation before fetching, so a value fetched
/// for the old catalog is written under the old generation and never read back.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    generation: Arc<AtomicU64>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Process-local cache
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn storage_key(&self, key: &CacheKey) -> String {
        Self::storage_key_at(self.generation(), key)
    }

    fn storage_key_at(generation: u64, key: &CacheKey) -> String {
        format!("{}{}:{}", KEY_PREFIX, generation, key)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Retrieves a value from the cache by key
    ///
    /// Store failures and undecodable entries are logged and reported as a
    /// miss, so a broken cache only costs an extra API call.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.get_from_cache_at(self.generation(), key).await
    }

    /// Like `get_from_cache`, reading the entry written under `generation`
    pub async fn get_from_cache_at<T: serde::de::DeserializeOwned>(
        &self,
        generation: u64,
        key: &CacheKey,
    ) -> Option<T> {
        let storage_key = Self::storage_key_at(generation, key);

        let raw = match self.store.get(&storage_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, key = %storage_key, store = self.store.name(), "Cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key = %storage_key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, key = %storage_key, "Cache deserialization error");
                None
            }
        }
    }

    /// Stores a value in the cache without blocking the caller
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T) {
        self.set_in_background_at(self.generation(), key, value);
    }

    /// Stores a value under `generation`, which may already be stale
    pub fn set_in_background_at<T: serde::Serialize>(&self, generation: u64, key: &CacheKey, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.store.set(Self::storage_key_at(generation, key), json);
    }

    /// Forgets every cached entry
    pub async fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, store = self.store.name(), "Failed to clear cache store");
        }

        tracing::info!(generation, store = self.store.name(), "Metadata cache invalidated");
    }
}
