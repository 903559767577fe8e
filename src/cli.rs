//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for viewstats using clap's derive macros.

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// viewstats - ad view / action ingestion and CTR reporting
#[derive(Parser, Debug)]
#[command(name = "viewstats")]
#[command(version)]
#[command(about = "Ingests ad view/action CSV files and serves CTR/EvPM reports", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Import a views CSV file
    ImportViews {
        /// Path to the CSV file (header row required)
        file_path: String,
    },

    /// Import an actions CSV file
    ImportActions {
        /// Path to the CSV file (header row required)
        file_path: String,
    },

    /// Delete all views and actions
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show row counts
    Stats,

    /// Generate example configuration file
    ConfigGen {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 未给出子命令时启动服务器
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
