use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Header value in the `Bearer <token>` form.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}

/// `data` payload of the refresh and login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

impl AccessToken {
    pub fn into_credential(self) -> Credential {
        Credential::new(self.access_token)
    }
}

/// Login input
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput").field("email", &self.email).finish_non_exhaustive()
    }
}

impl LoginInput {
    pub const PASSWORD_MIN: usize = 8;
    pub const PASSWORD_MAX: usize = 60;

    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_email(&self.email)?;
        let len = self.password.chars().count();
        if len < Self::PASSWORD_MIN {
            return Err(ModelError::Validation(format!("password too short (>= {})", Self::PASSWORD_MIN)));
        }
        if len > Self::PASSWORD_MAX {
            return Err(ModelError::Validation(format!("password too long (<= {})", Self::PASSWORD_MAX)));
        }
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let invalid = || ModelError::Validation("invalid email".into());
    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

/// Body returned by `POST /api/public/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub status: bool,
    #[serde(default)]
    pub data: Option<AccessToken>,
    #[serde(default)]
    pub message: String,
}
