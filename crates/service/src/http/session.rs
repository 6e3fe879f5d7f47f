use std::io::BufReader;
use std::sync::Arc;

use cookie_store::CookieStore;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, warn};

use crate::errors::StorageError;
use crate::storage::DurableStorage;

/// Durable key holding the serialized cookie jar (refresh session).
pub const COOKIES_KEY: &str = "sessionCookies";

/// Cookie jar shared with the HTTP client and mirrored into durable storage,
/// so the refresh session outlives the process like the access token does.
///
/// Session cookies (no `Expires`) are kept too; the jar is dropped on logout.
pub struct SessionCookies {
    jar: Arc<CookieStoreMutex>,
    storage: Arc<dyn DurableStorage>,
}

impl SessionCookies {
    /// Rehydrate the jar; an absent or unreadable snapshot starts empty.
    pub async fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let store = match storage.get_item(COOKIES_KEY).await {
            Some(raw) => cookie_store::serde::json::load(BufReader::new(raw.as_bytes())).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable cookie snapshot");
                CookieStore::default()
            }),
            None => CookieStore::default(),
        };
        debug!(cookies = store.iter_unexpired().count(), "session cookies rehydrated");
        Self { jar: Arc::new(CookieStoreMutex::new(store)), storage }
    }

    /// Handle for `reqwest::ClientBuilder::cookie_provider`.
    pub fn provider(&self) -> Arc<CookieStoreMutex> {
        self.jar.clone()
    }

    /// Write the current jar to durable storage.
    pub async fn persist(&self) -> Result<(), StorageError> {
        let raw = {
            let store = self
                .jar
                .lock()
                .map_err(|_| StorageError::Encode("cookie jar lock poisoned".into()))?;
            let mut buf = Vec::new();
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut buf)
                .map_err(|e| StorageError::Encode(e.to_string()))?;
            String::from_utf8(buf).map_err(|e| StorageError::Encode(e.to_string()))?
        };
        self.storage.set_item(COOKIES_KEY, raw).await
    }

    /// Empty the jar and forget the durable copy.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(COOKIES_KEY).await?;
        if let Ok(mut store) = self.jar.lock() {
            store.clear();
        }
        Ok(())
    }
}
