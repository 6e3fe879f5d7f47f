use thiserror::Error;

use crate::errors::{ClientError, StorageError};

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    /// The server answered but refused the credentials.
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Rejected(_) => 1004,
            AuthError::Client(ClientError::AuthExpired) => 1005,
            AuthError::Client(ClientError::Network(_)) => 1101,
            AuthError::Client(_) => 1102,
            AuthError::Storage(_) => 1200,
        }
    }
}

impl From<models::errors::ModelError> for AuthError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
        }
    }
}
