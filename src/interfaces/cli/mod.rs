//! CLI interface module
//!
//! This module provides command-line interface functionality for viewstats.

pub mod commands;

use std::fmt;

use crate::cli::Commands;
use crate::ingest::IngestKind;
use crate::runtime::lifetime::startup::StartupContext;
use crate::storage::StorageFactory;
use commands::{clear_data, config_generate, import_file, show_stats};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::StatsError> for CliError {
    fn from(err: crate::errors::StatsError) -> Self {
        if err.is_client_error() {
            CliError::ParseError(err.message())
        } else {
            CliError::StorageError(err.to_string())
        }
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // Generate doesn't need DB connection
    if let Commands::ConfigGen { output_path, force } = cmd {
        return config_generate(output_path, force).await;
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    let backend = storage.get_backend_config().storage_type;
    let context = StartupContext::from_storage(storage);

    match cmd {
        Commands::ImportViews { file_path } => {
            import_file(&context.ingest_service, IngestKind::Views, file_path)
                .await
                .map(|_| ())
        }
        Commands::ImportActions { file_path } => {
            import_file(&context.ingest_service, IngestKind::Actions, file_path)
                .await
                .map(|_| ())
        }
        Commands::Clear { yes } => clear_data(&context.ingest_service, yes).await,
        Commands::Stats => show_stats(&context.analytics_service, &backend).await,
        Commands::ConfigGen { .. } => unreachable!("handled above"),
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a one-shot command".to_string(),
        )),
    }
}
