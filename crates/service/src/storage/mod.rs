//! Durable key/value storage
//!
//! The client persists a handful of string values (the access token and the
//! association snapshot) under fixed keys, the way a browser app uses
//! `localStorage`. `JsonMapStore` keeps them in one JSON file; `MemoryStorage`
//! is the non-persistent variant used by tests and ephemeral sessions.

pub mod durable;
pub mod json_map_store;

pub use durable::{DurableStorage, MemoryStorage};
pub use json_map_store::JsonMapStore;
