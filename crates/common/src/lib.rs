//! Shared runtime helpers for the workspace: logging setup, the panic hook
//! and environment checks used by the binary and the service layer.

pub mod env;
pub mod utils;
