use serde::{Deserialize, Serialize};

/// Standard `{ data, message }` envelope used by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResponse<T> {
    pub data: T,
    #[serde(default)]
    pub message: String,
}
