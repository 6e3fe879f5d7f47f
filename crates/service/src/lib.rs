//! Client-side service layer for the CRM console.
//! - `http`: request pipeline with one silent token refresh per call, and
//!   the persisted session cookie jar.
//! - `auth`: credential cell kept in sync with durable storage; login/logout.
//! - `association`: the persisted contact <-> deal working selection.
//! - `crm`: contacts, deals and server-side association calls.
//! - `context`: wires everything from an `AppConfig`.

pub mod association;
pub mod auth;
pub mod context;
pub mod crm;
pub mod errors;
pub mod http;
pub mod storage;

pub use context::AppContext;
pub use errors::{ClientError, StorageError};
