//! CRM records (contacts, deals) and the server-side association calls.

pub mod service;

pub use service::CrmService;
