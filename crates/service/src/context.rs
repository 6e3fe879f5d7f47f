use std::sync::Arc;

use configs::AppConfig;
use tracing::info;

use crate::association::AssociationStore;
use crate::auth::{AuthError, AuthService, CredentialStore};
use crate::crm::CrmService;
use crate::http::{RequestClient, SessionCookies};
use crate::storage::{DurableStorage, JsonMapStore};

/// Application root: owns the storage, the credential cell, the session
/// cookies, the request client and the association store, and hands out the services built on
/// them. Create one per process.
pub struct AppContext {
    pub storage: Arc<dyn DurableStorage>,
    pub client: Arc<RequestClient>,
    pub auth: AuthService,
    pub crm: CrmService,
    pub associations: AssociationStore,
}

impl AppContext {
    /// Open `{data_dir}/{file_name}` as durable storage and wire everything.
    pub async fn bootstrap(cfg: &AppConfig) -> anyhow::Result<Self> {
        common::env::ensure_data_dir(&cfg.storage.data_dir).await?;
        let storage: Arc<dyn DurableStorage> = JsonMapStore::<String, String>::new(cfg.storage_path()).await?;
        info!(path = %cfg.storage_path().display(), "durable storage opened");
        Self::with_storage(cfg, storage).await
    }

    /// Wire everything over caller-provided storage.
    pub async fn with_storage(cfg: &AppConfig, storage: Arc<dyn DurableStorage>) -> anyhow::Result<Self> {
        let credentials = Arc::new(CredentialStore::load(storage.clone()).await);
        let session = Arc::new(SessionCookies::load(storage.clone()).await);
        let client = Arc::new(RequestClient::new(&cfg.api, credentials, session)?);
        let auth = AuthService::new(client.clone());
        let crm = CrmService::new(client.clone(), &cfg.cache);
        let associations = AssociationStore::initialize(storage.clone()).await;
        Ok(Self { storage, client, auth, crm, associations })
    }

    /// Drop the credential, the refresh session and everything cached under
    /// them.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.auth.logout().await?;
        self.client.session().clear().await?;
        self.crm.invalidate_cache();
        Ok(())
    }
}
