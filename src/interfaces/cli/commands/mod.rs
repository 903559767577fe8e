//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod clear;
mod config_gen;
mod import;
mod stats;

pub use clear::clear_data;
pub use config_gen::config_generate;
pub use import::import_file;
pub use stats::show_stats;
