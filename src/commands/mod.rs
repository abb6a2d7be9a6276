/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    - Interactive chat session
- `ask`     - One question, one printed response
- `samples` - Sample questions
- `schema`  - Schema description sent to the model

The handlers are small and only wire library components together:
providers, the warehouse executor, the schema catalog and the
orchestrator.
*/

use crate::chat::QueryOrchestrator;
use crate::config::Config;
use crate::database::SqliteExecutor;
use crate::error::Result;
use crate::prompts::sample_questions;
use crate::providers::create_provider;
use crate::schema::SchemaCatalog;

// Special commands parser for the REPL
pub mod special_commands;

// Table and insight rendering
pub mod render;

/// Builds an orchestrator from configuration
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `provider_name` - Optional override for the configured provider
///
/// # Errors
///
/// Returns an error if the provider cannot be created
pub fn build_orchestrator(config: &Config, provider_name: Option<&str>) -> Result<QueryOrchestrator> {
    let provider_type = provider_name.unwrap_or(&config.provider.provider_type);
    tracing::debug!("Using provider: {}", provider_type);

    let provider = create_provider(provider_type, &config.provider)?;
    let executor = SqliteExecutor::new(config.database.path.clone(), config.database.read_only);
    let catalog = SchemaCatalog::load(config.schema.data_model_path.as_deref());

    Ok(QueryOrchestrator::new(
        provider,
        Box::new(executor),
        &catalog,
        config.chat.clone(),
    ))
}

/// Numbered sample question lines
pub fn sample_lines() -> Vec<String> {
    sample_questions()
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{:>2}. {}", i + 1, q))
        .collect()
}

fn print_samples() {
    use colored::Colorize;

    println!("{}", "Sample questions".cyan().bold());
    for line in sample_lines() {
        println!("{}", line);
    }
    println!();
}

// Chat command handler
pub mod chat {
    //! Interactive chat session handler.
    //!
    //! Builds an orchestrator and runs a readline loop that sends each
    //! question through one chat turn and prints the envelope.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start an interactive chat session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `provider_name` - Optional override for the configured provider
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::commands::chat;
    /// use folio::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), None).await?;
    /// ```
    pub async fn run_chat(config: Config, provider_name: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat session");

        let mut orchestrator = build_orchestrator(&config, provider_name.as_deref())?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config, orchestrator.provider_name());

        loop {
            use colored::Colorize;

            match rl.readline(&format!("{} ", "folio>".green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::Reset) => {
                            orchestrator.reset_session();
                            println!("{}\n", "Conversation cleared.".yellow());
                            continue;
                        }
                        Ok(SpecialCommand::Samples) => {
                            print_samples();
                            continue;
                        }
                        Ok(SpecialCommand::ShowStatus) => {
                            print_status(&config, &orchestrator);
                            continue;
                        }
                        Ok(SpecialCommand::Help) => {
                            print_help();
                            continue;
                        }
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::None) => {}
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)?;

                    let envelope = orchestrator.handle_turn(trimmed).await;
                    super::render::print_envelope(&envelope);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(config: &Config, provider: &str) {
        use colored::Colorize;

        println!("{}", "Folio - portfolio chat".cyan().bold());
        println!("Provider: {}", provider);
        println!("Database: {}", config.database.path.display());
        println!("Ask a question about the portfolio, or type /help for commands.\n");
    }

    fn print_status(config: &Config, orchestrator: &QueryOrchestrator) {
        use colored::Colorize;

        let state = orchestrator.state();
        println!("{}", "Session status".cyan().bold());
        println!("Session:           {}", state.session_id());
        println!("Provider:          {}", orchestrator.provider_name());
        println!("Database:          {}", config.database.path.display());
        println!("Transcript turns:  {}", state.len());
        println!(
            "Last query:        {}",
            state.last_query().unwrap_or("(none)")
        );
        println!(
            "Last result rows:  {}\n",
            state.last_result().map(|r| r.row_count()).unwrap_or(0)
        );
    }
}

// One-shot question handler
pub mod ask {
    //! Runs a single chat turn and prints the envelope.

    use super::*;

    /// Ask one question
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `question` - Question text
    /// * `provider_name` - Optional override for the configured provider
    /// * `json` - Print the envelope as JSON instead of a table
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestrator cannot be built or the envelope
    /// cannot be serialized. A failed turn is printed, not returned.
    pub async fn run_ask(
        config: Config,
        question: String,
        provider_name: Option<String>,
        json: bool,
    ) -> Result<()> {
        let mut orchestrator = build_orchestrator(&config, provider_name.as_deref())?;
        let envelope = orchestrator.handle_turn(&question).await;

        if json {
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        } else {
            super::render::print_envelope(&envelope);
        }
        Ok(())
    }
}

// Sample questions handler
pub mod samples {
    //! Prints the sample question list.

    /// Print sample questions
    pub fn run_samples() {
        super::print_samples();
    }
}

// Schema description handler
pub mod schema {
    //! Prints the schema description the model receives.

    use super::*;

    /// Print the schema description for the configured data model
    pub fn run_schema(config: &Config) {
        let catalog = SchemaCatalog::load(config.schema.data_model_path.as_deref());
        if catalog.is_empty() {
            tracing::warn!("No data model loaded; showing the generic description");
        }
        println!("{}", catalog.describe());
    }
}
