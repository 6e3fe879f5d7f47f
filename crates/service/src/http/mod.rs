//! Request pipeline
//!
//! `RequestDescriptor` says what to call; `RequestClient` resolves it against
//! the configured base URL, stamps the bearer credential, and recovers from a
//! single expired-credential response by refreshing and replaying once.
//! `SessionCookies` keeps the refresh cookie across restarts.

pub mod client;
pub mod descriptor;
pub mod session;

pub use client::RequestClient;
pub use descriptor::{Feature, RequestDescriptor};
pub use session::{SessionCookies, COOKIES_KEY};
