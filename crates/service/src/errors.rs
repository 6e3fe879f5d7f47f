use thiserror::Error;

/// Failures of the durable key/value layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(String),
    #[error("storage encode error: {0}")]
    Encode(String),
    /// Stored bytes could not be decoded into the expected shape. Callers
    /// that own the key substitute defaults instead of surfacing this.
    #[error("malformed stored value for `{key}`: {reason}")]
    Malformed { key: String, reason: String },
}

/// Failures of the request pipeline. Only a single 401 is recovered
/// locally; everything here reaches the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },
    /// 401 on the replayed request, or the refresh call itself failed.
    /// The caller has to authenticate again.
    #[error("session expired; please log in again")]
    AuthExpired,
    #[error("not logged in")]
    MissingCredential,
    /// 2xx reply whose body reports failure (`success: false`).
    #[error("request rejected by the server: {0}")]
    Rejected(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
