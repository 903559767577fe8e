//! System-level modules
//!
//! - Logging initialization (tracing subscriber + optional rolling file)

pub mod logging;

pub use logging::init_logging;
