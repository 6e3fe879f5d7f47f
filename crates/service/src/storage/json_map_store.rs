use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::StorageError;
use crate::storage::durable::DurableStorage;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides simple CRUD helpers.
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash never leaves a half-written map behind.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + PartialEq,
{
    /// Initialize the store from a path. Creates the file with an empty map if
    /// missing; an unreadable or malformed file is treated as empty.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "malformed storage file; starting empty");
                HashMap::new()
            }),
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StorageError> {
        self.update_map(|m| {
            m.insert(key, value);
            Ok(())
        })
        .await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StorageError> {
        let mut existed = false;
        self.update_map(|m| {
            existed = m.remove(key).is_some();
            Ok(())
        })
        .await?;
        Ok(existed)
    }

    /// Apply a mutation to the underlying map and persist while still holding
    /// the write lock, so concurrent writers cannot interleave file writes.
    pub async fn update_map<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<(), StorageError>,
    {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        f(&mut next)?;
        write_atomic(&self.file_path, &next).await?;
        *map = next;
        Ok(())
    }
}

async fn write_atomic<T: serde::Serialize>(path: &std::path::Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec(value).map_err(|e| StorageError::Encode(e.to_string()))?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, data).await.map_err(|e| StorageError::Io(e.to_string()))?;
    fs::rename(&tmp, path).await.map_err(|e| StorageError::Io(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl DurableStorage for JsonMapStore<String, String> {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.get(&key.to_string()).await
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.insert(key.to_string(), value).await
    }

    async fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        self.remove(&key.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("token".into(), "t1".into()).await?;
        store.insert("contactDealAssociation".into(), "{}".into()).await?;
        assert_eq!(store.get(&"token".into()).await.as_deref(), Some("t1"));

        store
            .update_map(|m| {
                if let Some(v) = m.get_mut("token") { *v = "t2".into(); }
                Ok(())
            })
            .await?;

        // remove and reload persistence
        assert!(store.remove(&"contactDealAssociation".into()).await?);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.list().await.len(), 1);
        assert_eq!(reloaded.get_item("token").await.as_deref(), Some("t2"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_loads_empty_and_is_repaired_on_write() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        tokio::fs::write(&tmp, b"{not json").await?;

        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        assert!(store.list().await.is_empty());

        store.set_item("token", "fresh".into()).await?;
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.get_item("token").await.as_deref(), Some("fresh"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_leaves_map_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_path();
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        store.insert("k".into(), "v".into()).await?;

        let res = store
            .update_map(|m| {
                m.clear();
                Err(StorageError::Io("boom".into()))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(store.get(&"k".into()).await.as_deref(), Some("v"));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
