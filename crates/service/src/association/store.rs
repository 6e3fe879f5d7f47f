use std::sync::Arc;

use models::{Association, AssociationPatch};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::errors::StorageError;
use crate::storage::DurableStorage;

/// Durable key holding the JSON-serialized [`Association`].
pub const ASSOCIATION_KEY: &str = "contactDealAssociation";

/// Holds the current contact/deal selection and mirrors it to durable storage.
///
/// Mutators are serialized and persist before publishing, so once one returns
/// the durable copy, [`AssociationStore::current`] and every subscriber agree.
/// Storage failures are logged and never surface to callers.
///
/// ```
/// use std::sync::Arc;
/// use models::{Association, AssociationPatch};
/// use service::association::AssociationStore;
/// use service::storage::{DurableStorage, MemoryStorage};
///
/// let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::new());
/// let store = tokio_test::block_on(AssociationStore::initialize(storage));
/// tokio_test::block_on(store.set_contact_deal(AssociationPatch::email("a@b.com")));
/// let now = tokio_test::block_on(store.set_contact_deal(AssociationPatch::deal("D1")));
/// assert_eq!(now, Association::new("a@b.com", "D1"));
/// ```
pub struct AssociationStore {
    storage: Arc<dyn DurableStorage>,
    state: watch::Sender<Association>,
    write_gate: Mutex<()>,
}

impl AssociationStore {
    /// Rehydrate from durable storage; absent or malformed data yields the
    /// empty association.
    pub async fn initialize(storage: Arc<dyn DurableStorage>) -> Self {
        let initial = match load(storage.as_ref()).await {
            Ok(Some(association)) => association,
            Ok(None) => Association::default(),
            Err(e) => {
                warn!(error = %e, "resetting unreadable association snapshot");
                Association::default()
            }
        };
        debug!(email = %initial.email, deal_id = %initial.deal_id, "association initialized");
        let (state, _) = watch::channel(initial);
        Self { storage, state, write_gate: Mutex::new(()) }
    }

    pub fn current(&self) -> Association {
        self.state.borrow().clone()
    }

    /// Receiver that always observes the latest association.
    pub fn subscribe(&self) -> watch::Receiver<Association> {
        self.state.subscribe()
    }

    /// Merge `patch` into the current association; absent fields keep their
    /// value. Returns the resulting association.
    pub async fn set_contact_deal(&self, patch: AssociationPatch) -> Association {
        let _gate = self.write_gate.lock().await;
        let next = self.current().merged(&patch);
        self.commit(next).await
    }

    /// Back to `{ email: "", deal_id: "" }`.
    pub async fn reset_contact_deal(&self) {
        let _gate = self.write_gate.lock().await;
        self.commit(Association::default()).await;
    }

    /// Persist, then publish. Caller holds the write gate.
    async fn commit(&self, next: Association) -> Association {
        if let Err(e) = persist(self.storage.as_ref(), &next).await {
            warn!(error = %e, "association not persisted; keeping it in memory");
        }
        self.state.send_replace(next.clone());
        debug!(email = %next.email, deal_id = %next.deal_id, "association updated");
        next
    }
}

async fn load(storage: &dyn DurableStorage) -> Result<Option<Association>, StorageError> {
    let Some(raw) = storage.get_item(ASSOCIATION_KEY).await else {
        return Ok(None);
    };
    serde_json::from_str::<Association>(&raw)
        .map(Some)
        .map_err(|e| StorageError::Malformed { key: ASSOCIATION_KEY.to_string(), reason: e.to_string() })
}

async fn persist(storage: &dyn DurableStorage, association: &Association) -> Result<(), StorageError> {
    let raw = serde_json::to_string(association).map_err(|e| StorageError::Encode(e.to_string()))?;
    storage.set_item(ASSOCIATION_KEY, raw).await
}
