//! Error types for Folio
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Folio operations
///
/// Covers configuration loading, provider interactions, database access and
/// the failure categories a chat turn can end in.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, response parsing, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Database connection errors
    #[error("Database error: {0}")]
    Database(String),

    /// A follow-up request arrived before any query succeeded
    #[error("No previous query to expand. Please ask a specific question first.")]
    NoPriorQuery,

    /// Neither a template nor the generative step produced usable SQL
    #[error("{0}")]
    Resolution(String),

    /// The database rejected or failed to run the resolved SQL
    #[error("{0}")]
    Execution(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl FolioError {
    /// Classifies this error for the response envelope
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::error::{ErrorKind, FolioError};
    ///
    /// assert_eq!(FolioError::NoPriorQuery.kind(), ErrorKind::NoPriorQuery);
    /// assert_eq!(
    ///     FolioError::Provider("timeout".to_string()).kind(),
    ///     ErrorKind::GeneralFailure
    /// );
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPriorQuery => ErrorKind::NoPriorQuery,
            Self::Resolution(_) => ErrorKind::ResolutionFailure,
            Self::Execution(_) | Self::Database(_) => ErrorKind::ExecutionFailure,
            _ => ErrorKind::GeneralFailure,
        }
    }
}

/// User-facing failure category carried on a failed response envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Follow-up without a previous successful query
    NoPriorQuery,
    /// No usable SQL could be produced for the question
    ResolutionFailure,
    /// The database could not run the query
    ExecutionFailure,
    /// Anything else (provider outage on a general question, etc.)
    GeneralFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPriorQuery => write!(f, "no_prior_query"),
            Self::ResolutionFailure => write!(f, "resolution_failure"),
            Self::ExecutionFailure => write!(f, "execution_failure"),
            Self::GeneralFailure => write!(f, "general_failure"),
        }
    }
}

/// Result type alias for Folio operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
