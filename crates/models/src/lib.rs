//! Wire and domain types shared by the service layer and the console.
//! - Field names follow the CRM API's JSON (`deal_id`, `accessToken`, ...).
//! - No I/O lives here; validation helpers only.

pub mod association;
pub mod auth;
pub mod contact;
pub mod deal;
pub mod envelope;
pub mod errors;

pub use association::{Association, AssociationPatch, StoredAssociation};
pub use auth::{AccessToken, Credential, LoginInput, LoginResponse};
pub use contact::{Contact, ContactProperties, ContactsResponse};
pub use deal::{Deal, DealProperties, DealsResponse};
pub use envelope::FetchResponse;
