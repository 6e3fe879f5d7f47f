use models::Credential;
use reqwest::Method;
use serde::Serialize;

use crate::errors::ClientError;

/// API namespace under `/api/{public|private}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Auth,
    Crm,
    OAuth,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Auth => "auth",
            Feature::Crm => "crm",
            Feature::OAuth => "oauth",
        }
    }
}

/// Everything needed to issue one API call.
///
/// The target is `/api/private/...` iff `credential` is set, `/api/public/...`
/// otherwise.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub feature: Feature,
    pub endpoint: String,
    pub method: Method,
    pub payload: Option<serde_json::Value>,
    pub credential: Option<Credential>,
}

impl RequestDescriptor {
    pub fn new(feature: Feature, endpoint: impl Into<String>, method: Method) -> Self {
        Self { feature, endpoint: endpoint.into(), method, payload: None, credential: None }
    }

    pub fn get(feature: Feature, endpoint: impl Into<String>) -> Self {
        Self::new(feature, endpoint, Method::GET)
    }

    pub fn post(feature: Feature, endpoint: impl Into<String>) -> Self {
        Self::new(feature, endpoint, Method::POST)
    }

    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, ClientError> {
        let value = serde_json::to_value(payload).map_err(|e| ClientError::Validation(e.to_string()))?;
        self.payload = Some(value);
        Ok(self)
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn is_private(&self) -> bool {
        self.credential.is_some()
    }

    /// `/api/{public|private}/{feature}/{endpoint}`, no base URL.
    pub fn path(&self) -> String {
        let scope = if self.is_private() { "private" } else { "public" };
        format!("/api/{scope}/{}/{}", self.feature.as_str(), self.endpoint.trim_start_matches('/'))
    }

    pub fn url(&self, base_url: &str) -> String {
        join_url(base_url, &self.path())
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
