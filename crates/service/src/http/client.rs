use std::sync::Arc;

use configs::ApiConfig;
use models::{AccessToken, Credential, FetchResponse};
use reqwest::header::{HeaderName, CONTENT_TYPE, SET_COOKIE};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::descriptor::{join_url, Feature, RequestDescriptor};
use super::session::SessionCookies;
use crate::auth::credential::CredentialStore;
use crate::errors::ClientError;

pub const REFRESH_ENDPOINT: &str = "refresh";

/// Replays allowed after a 401. The refresh call itself never replays.
const MAX_REFRESH_RETRIES: u32 = 1;

/// HTTP client for the CRM API.
///
/// One instance per application. Cookies (the refresh session) live in a
/// [`SessionCookies`] jar that is persisted whenever a response sets one;
/// the current credential is read from the shared [`CredentialStore`] at
/// dispatch time.
pub struct RequestClient {
    http: reqwest::Client,
    base_url: String,
    bearer_header: HeaderName,
    credentials: Arc<CredentialStore>,
    session: Arc<SessionCookies>,
    /// Serializes refresh calls; see [`RequestClient::refresh_after`].
    refresh_gate: Mutex<()>,
}

impl RequestClient {
    pub fn new(
        cfg: &ApiConfig,
        credentials: Arc<CredentialStore>,
        session: Arc<SessionCookies>,
    ) -> Result<Self, ClientError> {
        let bearer_header = HeaderName::from_bytes(cfg.bearer_header.as_bytes())
            .map_err(|e| ClientError::Config(format!("bearer header `{}`: {e}", cfg.bearer_header)))?;
        let mut builder = reqwest::Client::builder().cookie_provider(session.provider());
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            bearer_header,
            credentials,
            session,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn session(&self) -> &Arc<SessionCookies> {
        &self.session
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.credentials.current()
    }

    /// Issue an `/api/...` call and decode the JSON body.
    ///
    /// The bearer header carries the descriptor's credential, or the current
    /// one when the descriptor has none. A 401 triggers one refresh and one
    /// replay; a second 401 fails with [`ClientError::AuthExpired`].
    #[instrument(level = "debug", skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path()))]
    pub async fn send<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T, ClientError> {
        let url = descriptor.url(&self.base_url);
        let credential = descriptor.credential.clone().or_else(|| self.credentials.current());
        self.execute(&descriptor.method, &url, descriptor.payload.as_ref(), credential).await
    }

    /// Single attempt with only the descriptor's own credential: no default
    /// header, no refresh on 401. Used for login, where a 401 means the
    /// submitted credentials were wrong.
    #[instrument(level = "debug", skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path()))]
    pub async fn send_once<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T, ClientError> {
        let url = descriptor.url(&self.base_url);
        let response = self
            .dispatch(&descriptor.method, &url, descriptor.payload.as_ref(), descriptor.credential.as_ref())
            .await?;
        decode(response).await
    }

    /// Same pipeline for routes outside the `/api` namespace.
    #[instrument(level = "debug", skip(self, payload))]
    pub async fn send_to<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&serde_json::Value>,
    ) -> Result<T, ClientError> {
        let url = join_url(&self.base_url, path);
        self.execute(&method, &url, payload, self.credentials.current()).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&serde_json::Value>,
        mut credential: Option<Credential>,
    ) -> Result<T, ClientError> {
        let mut retries: u32 = 0;
        loop {
            match self.dispatch(method, url, payload, credential.as_ref()).await {
                Ok(response) => return decode(response).await,
                Err(ClientError::Http { status: 401, .. }) if retries < MAX_REFRESH_RETRIES => {
                    retries += 1;
                    debug!(retries, "credential rejected; refreshing before replay");
                    credential = Some(self.refresh_after(credential.as_ref()).await?);
                }
                Err(ClientError::Http { status: 401, message }) => {
                    warn!(%message, "credential rejected after refresh");
                    return Err(ClientError::AuthExpired);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        payload: Option<&serde_json::Value>,
        credential: Option<&Credential>,
    ) -> Result<Response, ClientError> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(credential) = credential {
            request = request.header(self.bearer_header.clone(), credential.bearer());
        }
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed before a response arrived");
            ClientError::Network(e.to_string())
        })?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "response received");
        if response.headers().contains_key(SET_COOKIE) {
            if let Err(e) = self.session.persist().await {
                warn!(error = %e, "session cookies not persisted");
            }
        }
        if status.is_success() {
            return Ok(response);
        }
        let message = error_message(response).await;
        Err(ClientError::Http { status: status.as_u16(), message })
    }

    /// Obtain a credential to replace `rejected`.
    ///
    /// Only one refresh runs at a time. A caller that waited on the gate and
    /// finds the current credential already differs from the one it was
    /// rejected with reuses it instead of refreshing again.
    async fn refresh_after(&self, rejected: Option<&Credential>) -> Result<Credential, ClientError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.credentials.current() {
            if rejected != Some(&current) {
                debug!("credential already replaced by a concurrent refresh");
                return Ok(current);
            }
        }

        let url = RequestDescriptor::get(Feature::Auth, REFRESH_ENDPOINT).url(&self.base_url);
        let response = self.dispatch(&Method::GET, &url, None, None).await.map_err(|e| {
            warn!(error = %e, "token refresh rejected");
            ClientError::AuthExpired
        })?;
        let envelope: FetchResponse<AccessToken> = decode(response).await.map_err(|e| {
            warn!(error = %e, "token refresh returned an unexpected body");
            ClientError::AuthExpired
        })?;
        let credential = envelope.data.into_credential();
        if credential.is_blank() {
            warn!("token refresh returned an empty token");
            return Err(ClientError::AuthExpired);
        }
        self.credentials.replace(credential.clone()).await?;
        info!("access token refreshed");
        Ok(credential)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response.json::<T>().await.map_err(|e| ClientError::Decode(e.to_string()))
}

/// Human-readable reason from an error body: `message`, then `error`, then
/// the raw text, then the status line.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(&text) {
        for field in ["message", "error", "detail"] {
            if let Some(msg) = body.get(field).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    if !text.trim().is_empty() {
        return text;
    }
    status.canonical_reason().unwrap_or("request failed").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DurableStorage, MemoryStorage};

    async fn client_for(cfg: ApiConfig) -> Result<RequestClient, ClientError> {
        let storage: Arc<dyn DurableStorage> = Arc::new(MemoryStorage::new());
        let credentials = Arc::new(CredentialStore::load(storage.clone()).await);
        let session = Arc::new(SessionCookies::load(storage).await);
        RequestClient::new(&cfg, credentials, session)
    }

    async fn client_with(header: &str) -> Result<RequestClient, ClientError> {
        client_for(ApiConfig { bearer_header: header.into(), ..ApiConfig::default() }).await
    }

    #[tokio::test]
    async fn rejects_invalid_header_name() {
        assert!(matches!(client_with("bad header").await, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn base_url_is_normalized() -> Result<(), ClientError> {
        let client = client_for(ApiConfig { base_url: "http://localhost:9/".into(), ..ApiConfig::default() }).await?;
        assert_eq!(client.base_url(), "http://localhost:9");
        assert!(client.current_credential().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() -> Result<(), ClientError> {
        // port 9 (discard) on localhost is closed in test environments
        let client = client_for(ApiConfig { base_url: "http://127.0.0.1:9".into(), ..ApiConfig::default() }).await?;
        let res: Result<serde_json::Value, _> =
            client.send(&RequestDescriptor::get(Feature::Auth, REFRESH_ENDPOINT)).await;
        assert!(matches!(res, Err(ClientError::Network(_))));
        Ok(())
    }
}
