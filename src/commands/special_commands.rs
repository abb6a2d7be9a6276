//! Special commands parser for interactive chat
//!
//! Commands are prefixed with `/` and are case-insensitive. `exit` and
//! `quit` also work without the prefix.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands handled by the REPL instead of the chat core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Forget the previous query and the transcript
    Reset,
    /// List sample questions
    Samples,
    /// Show provider, database and session details
    ShowStatus,
    /// Display help information
    Help,
    /// Exit the interactive session
    Exit,
    /// Not a special command; send the input to the chat core
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns [`CommandError::UnknownCommand`] for input that starts with `/`
/// but names no known command.
///
/// # Examples
///
/// ```
/// use folio::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/reset").unwrap(), SpecialCommand::Reset);
/// assert_eq!(parse_special_command("QUIT").unwrap(), SpecialCommand::Exit);
/// assert_eq!(parse_special_command("list funds").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/reset" | "/clear" => Ok(SpecialCommand::Reset),
        "/samples" | "/examples" => Ok(SpecialCommand::Samples),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "exit" | "quit" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!(
        r#"
Special Commands
================

SESSION:
  /reset          - Forget the previous query and conversation
  /clear          - Same as /reset
  /status         - Show provider, database and session details

QUESTIONS:
  /samples        - List sample questions
  show all results - Re-run the previous query without its row limit

OTHER:
  /help           - Show this help message
  exit, quit      - Leave the session
"#
    );
}
