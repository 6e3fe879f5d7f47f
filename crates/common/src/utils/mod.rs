pub mod logging;
pub mod panic;
