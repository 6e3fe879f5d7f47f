use std::sync::Arc;

use arc_swap::ArcSwapOption;
use models::Credential;
use tracing::{debug, info};

use crate::errors::StorageError;
use crate::storage::DurableStorage;

/// Durable key holding the access token between runs.
pub const TOKEN_KEY: &str = "token";

/// The current bearer credential, mirrored into durable storage.
///
/// Reads are lock-free snapshots taken at dispatch time. The two writers,
/// [`CredentialStore::replace`] and [`CredentialStore::clear`], are
/// crate-private: only login, refresh and logout move the credential.
pub struct CredentialStore {
    current: ArcSwapOption<Credential>,
    storage: Arc<dyn DurableStorage>,
}

impl CredentialStore {
    /// Rehydrate from durable storage. A missing or blank token means
    /// "not logged in".
    pub async fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let restored = storage
            .get_item(TOKEN_KEY)
            .await
            .map(Credential::new)
            .filter(|c| !c.is_blank());
        debug!(restored = restored.is_some(), "credential rehydrated");
        Self { current: ArcSwapOption::new(restored.map(Arc::new)), storage }
    }

    pub fn current(&self) -> Option<Credential> {
        self.current.load_full().map(|c| (*c).clone())
    }

    pub fn is_present(&self) -> bool {
        self.current.load().is_some()
    }

    /// Durable copy first, then the in-memory cell, so a failed write never
    /// leaves memory ahead of disk.
    pub(crate) async fn replace(&self, credential: Credential) -> Result<(), StorageError> {
        self.storage.set_item(TOKEN_KEY, credential.as_str().to_string()).await?;
        self.current.store(Some(Arc::new(credential)));
        info!("credential updated");
        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY).await?;
        self.current.store(None);
        info!("credential cleared");
        Ok(())
    }
}
