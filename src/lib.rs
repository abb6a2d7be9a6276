//! Folio - conversational SQL assistant library
//!
//! This library turns natural-language questions about a real-estate
//! investment portfolio into SQL, runs them against the warehouse and
//! narrates the results.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `chat`: The chat core (normalizer, intent classifier, session context,
//!   SQL templates and resolver, insight summarizer, orchestrator)
//! - `providers`: Generative text abstraction and implementations (OpenAI, Ollama)
//! - `database`: Warehouse executor abstraction and the SQLite implementation
//! - `schema`: Data-model document and its prompt description
//! - `prompts`: Prompt text, canned replies and sample questions
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use folio::commands::build_orchestrator;
//! use folio::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut orchestrator = build_orchestrator(&config, None)?;
//!     let envelope = orchestrator.handle_turn("top 3 performing assets").await;
//!     println!("{}", envelope.insights);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod schema;

// Re-export commonly used types
pub use chat::{QueryOrchestrator, ResponseEnvelope};
pub use config::Config;
pub use error::{FolioError, Result};

#[cfg(test)]
pub mod test_utils;
