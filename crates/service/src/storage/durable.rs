use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StorageError;

/// String key/value storage that survives restarts.
/// Implementations can be file-backed, in-memory, or anything else that
/// keeps the write visible to the next `get_item` once it returns.
#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;
    /// Returns whether the key existed.
    async fn remove_item(&self, key: &str) -> Result<bool, StorageError>;
}

/// Volatile storage, for tests and sessions that should leave nothing behind.
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded storage, e.g. to simulate what an earlier run left behind.
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let items = items.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { items: RwLock::new(items) }
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().await.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.items.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_crud() -> Result<(), StorageError> {
        let storage = MemoryStorage::with_items([("token", "abc")]);
        assert_eq!(storage.get_item("token").await.as_deref(), Some("abc"));

        storage.set_item("token", "def".into()).await?;
        assert_eq!(storage.get_item("token").await.as_deref(), Some("def"));

        assert!(storage.remove_item("token").await?);
        assert!(!storage.remove_item("token").await?);
        assert!(storage.get_item("token").await.is_none());
        Ok(())
    }
}
