use std::sync::Arc;

use models::{Credential, LoginInput, LoginResponse};
use tracing::{info, instrument, warn};

use super::errors::AuthError;
use crate::errors::ClientError;
use crate::http::{Feature, RequestClient, RequestDescriptor};

pub const LOGIN_ENDPOINT: &str = "login";

/// Login/logout on top of the request client.
pub struct AuthService {
    client: Arc<RequestClient>,
}

impl AuthService {
    pub fn new(client: Arc<RequestClient>) -> Self { Self { client } }

    pub fn is_authenticated(&self) -> bool {
        self.client.credentials().is_present()
    }

    /// Authenticate with email and password.
    ///
    /// On success the access token becomes the current credential (memory and
    /// durable copy) and the server's refresh cookie lands in the client's
    /// cookie jar.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<Credential, AuthError> {
        input.validate()?;

        let descriptor = RequestDescriptor::post(Feature::Auth, LOGIN_ENDPOINT)
            .with_payload(&input)
            .map_err(AuthError::Client)?;
        // no bearer, no refresh: a 401 here means bad credentials
        let response: LoginResponse = match self.client.send_once(&descriptor).await {
            Err(ClientError::Http { status: 401, message }) => {
                warn!(%message, "login rejected");
                return Err(AuthError::Rejected(message));
            }
            other => other?,
        };

        if !response.status {
            warn!(message = %response.message, "login rejected");
            return Err(AuthError::Rejected(response.message));
        }
        let credential = response
            .data
            .map(|d| d.into_credential())
            .filter(|c| !c.is_blank())
            .ok_or_else(|| AuthError::Rejected("server returned no access token".into()))?;

        self.client.credentials().replace(credential.clone()).await?;
        info!("user_logged_in");
        Ok(credential)
    }

    /// Forget the credential locally, memory and durable copy together.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.client.credentials().clear().await?;
        info!("user_logged_out");
        Ok(())
    }

    /// Browser URL that starts the server-side OAuth flow for `provider`.
    pub fn oauth_url(&self, provider: &str) -> String {
        format!(
            "{}/api/public/{}/{}",
            self.client.base_url(),
            Feature::OAuth.as_str(),
            provider.trim().to_lowercase()
        )
    }
}
