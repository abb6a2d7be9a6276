//! Command-line interface definition for Folio
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot questions and
//! inspecting the configured data model.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio - conversational SQL assistant for real-estate portfolios
///
/// Ask questions about assets, funds, debt and performance in plain
/// language and get tabular results with narrative insights.
#[derive(Parser, Debug, Clone)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the warehouse database path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Override the data-model document path
    #[arg(long, global = true)]
    pub data_model: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Folio
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Ask a single question and print the response
    Ask {
        /// The question to ask
        question: String,

        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Print the response envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sample questions
    Samples,

    /// Print the schema description sent to the model
    Schema,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            database: None,
            data_model: None,
            command: Commands::Samples,
        }
    }
}
