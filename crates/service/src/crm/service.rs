use std::sync::Arc;

use configs::CacheConfig;
use models::association::{LinkResponse, LinksResponse};
use models::{Association, Contact, ContactsResponse, Credential, Deal, DealsResponse, StoredAssociation};
use moka::future::Cache;
use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::association::AssociationStore;
use crate::errors::ClientError;
use crate::http::{Feature, RequestClient, RequestDescriptor};

pub const CONTACTS_ENDPOINT: &str = "contacts/";
pub const DEALS_ENDPOINT: &str = "deals/";
pub const LINK_CREATE_PATH: &str = "/association/create/";
pub const LINK_LIST_PATH: &str = "/association/all/";

/// Contacts, deals and association calls for the logged-in user.
///
/// Contact listings are cached per credential for the configured TTL, so
/// re-filtering the same list does not hit the API again.
pub struct CrmService {
    client: Arc<RequestClient>,
    contacts: Cache<Credential, Arc<Vec<Contact>>>,
}

impl CrmService {
    pub fn new(client: Arc<RequestClient>, cfg: &CacheConfig) -> Self {
        let contacts = Cache::builder()
            .max_capacity(cfg.max_entries)
            .time_to_live(cfg.contacts_ttl())
            .build();
        Self { client, contacts }
    }

    fn require_credential(&self) -> Result<Credential, ClientError> {
        self.client.current_credential().ok_or(ClientError::MissingCredential)
    }

    /// All contacts, optionally filtered by `search` (first name, last name,
    /// email; case-insensitive).
    #[instrument(skip(self))]
    pub async fn contacts(&self, search: Option<&str>) -> Result<Vec<Contact>, ClientError> {
        let credential = self.require_credential()?;
        let all = match self.contacts.get(&credential).await {
            Some(cached) => {
                debug!(count = cached.len(), "contacts served from cache");
                cached
            }
            None => {
                let descriptor = RequestDescriptor::get(Feature::Crm, CONTACTS_ENDPOINT)
                    .with_credential(Some(credential));
                let response: ContactsResponse = self.client.send(&descriptor).await?;
                let fetched = Arc::new(response.contacts);
                // a refresh may have replaced the credential mid-call; cache
                // under the one that will be used next time
                if let Some(current) = self.client.current_credential() {
                    self.contacts.insert(current, fetched.clone()).await;
                }
                info!(count = fetched.len(), "contacts fetched");
                fetched
            }
        };
        Ok(filter_by(&all, search, Contact::matches))
    }

    #[instrument(skip(self))]
    pub async fn deals(&self, search: Option<&str>) -> Result<Vec<Deal>, ClientError> {
        let credential = self.require_credential()?;
        let descriptor = RequestDescriptor::get(Feature::Crm, DEALS_ENDPOINT).with_credential(Some(credential));
        let response: DealsResponse = self.client.send(&descriptor).await?;
        info!(count = response.deals.len(), "deals fetched");
        Ok(filter_by(&response.deals, search, Deal::matches))
    }

    /// Persist the current selection server-side. Both halves must be set.
    #[instrument(skip(self, store))]
    pub async fn link_selection(&self, store: &AssociationStore) -> Result<i64, ClientError> {
        let selection = store.current();
        self.link(&selection).await
    }

    pub async fn link(&self, association: &Association) -> Result<i64, ClientError> {
        if !association.is_complete() {
            return Err(ClientError::Validation("please select both a contact and a deal".into()));
        }
        let payload = serde_json::to_value(association).map_err(|e| ClientError::Validation(e.to_string()))?;
        let response: LinkResponse = self.client.send_to(Method::POST, LINK_CREATE_PATH, Some(&payload)).await?;
        if !response.success {
            return Err(ClientError::Rejected(
                response.error.unwrap_or_else(|| "association was not created".into()),
            ));
        }
        let id = response.id.ok_or_else(|| ClientError::Decode("association id missing".into()))?;
        info!(id, email = %association.email, deal_id = %association.deal_id, "deal linked to contact");
        Ok(id)
    }

    pub async fn links(&self) -> Result<Vec<StoredAssociation>, ClientError> {
        let response: LinksResponse = self.client.send_to(Method::GET, LINK_LIST_PATH, None).await?;
        if !response.success {
            return Err(ClientError::Rejected(
                response.error.unwrap_or_else(|| "could not list associations".into()),
            ));
        }
        Ok(response.associations)
    }

    pub fn invalidate_cache(&self) {
        self.contacts.invalidate_all();
    }
}

fn filter_by<T: Clone>(items: &[T], search: Option<&str>, matches: fn(&T, &str) -> bool) -> Vec<T> {
    match search {
        Some(term) if !term.trim().is_empty() => items.iter().filter(|i| matches(i, term)).cloned().collect(),
        _ => items.to_vec(),
    }
}
