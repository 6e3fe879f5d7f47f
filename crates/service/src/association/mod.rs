//! The contact <-> deal working selection, persisted across restarts.

pub mod store;

pub use store::{AssociationStore, ASSOCIATION_KEY};
