use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::AppResult;

use super::cache::CacheStore;

/// In-process cache store, used when no Redis URL is configured
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: String, value: String) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value);
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
