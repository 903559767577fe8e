//! Service layer for business logic
//!
//! This module provides unified business logic that can be shared between
//! different interfaces (HTTP API, CLI).

mod analytics_service;
mod ingest_service;

pub use analytics_service::*;
pub use ingest_service::*;
