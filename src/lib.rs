//! viewstats - ad view / action ingestion and reporting
//!
//! Ingests CSV exports of ad views and user actions into a relational store
//! (SQLite, MySQL or PostgreSQL via SeaORM) and answers count, CTR and EvPM
//! queries over HTTP or from the command line.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `ingest`: CSV parsing and action aggregation
//! - `storage`: Storage backends and data access
//! - `analytics`: Tag rules, time buckets and ratio scaling
//! - `services`: Ingest and analytics services
//! - `api`: HTTP handlers
//! - `interfaces`: CLI commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod interfaces;
pub mod observer;
#[cfg(feature = "server")]
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
