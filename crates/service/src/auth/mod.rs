//! Auth module: the credential cell and the login/logout workflow built on
//! the request client.

pub mod credential;
pub mod errors;
pub mod service;

pub use credential::{CredentialStore, TOKEN_KEY};
pub use errors::AuthError;
pub use service::AuthService;
