//! Base provider trait and common types for Folio
//!
//! This module defines the Provider trait that every generative text
//! backend implements, along with the message, option and response types
//! shared by the SQL generation, insight and general-question calls.

use crate::error::{FolioError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message structure for a completion request
///
/// Represents a single chat message sent to or received from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::providers::Message;
    ///
    /// let msg = Message::user("How many properties do we own?");
    /// assert_eq!(msg.role, "user");
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new assistant message
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::providers::Message;
    ///
    /// let msg = Message::assistant("SELECT COUNT(*) FROM DimAsset");
    /// assert_eq!(msg.role, "assistant");
    /// ```
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Creates a new system message
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::providers::Message;
    ///
    /// let msg = Message::system("You are an expert SQL developer.");
    /// assert_eq!(msg.role, "system");
    /// ```
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options for a single completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionOptions {
    /// Create options with the given temperature and token cap
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::providers::CompletionOptions;
    ///
    /// let options = CompletionOptions::new(0.1, 800);
    /// assert_eq!(options.max_tokens, 800);
    /// ```
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::new(0.5, 400)
    }
}

/// Token usage information from a completion
///
/// Tracks the number of tokens used in prompts and completions,
/// as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt
    pub prompt_tokens: usize,
    /// Number of tokens in the completion
    pub completion_tokens: usize,
    /// Total tokens used (prompt + completion)
    pub total_tokens: usize,
}

impl TokenUsage {
    /// Create a new TokenUsage instance
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::providers::TokenUsage;
    ///
    /// let usage = TokenUsage::new(100, 50);
    /// assert_eq!(usage.total_tokens, 150);
    /// ```
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Completion response with message and optional token usage
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// The response message from the model
    pub message: Message,
    /// Optional token usage information
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Create a new CompletionResponse
    pub fn new(message: Message) -> Self {
        Self {
            message,
            usage: None,
        }
    }

    /// Create a new CompletionResponse with token usage
    pub fn with_usage(message: Message, usage: TokenUsage) -> Self {
        Self {
            message,
            usage: Some(usage),
        }
    }
}

/// Provider trait for generative text backends
///
/// The chat core treats the model as a black box: it sends a system
/// instruction plus a user prompt and reads back plain text.
///
/// # Examples
///
/// ```no_run
/// use folio::providers::{CompletionOptions, CompletionResponse, Message, Provider};
/// use folio::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn complete(
///         &self,
///         messages: &[Message],
///         _options: &CompletionOptions,
///     ) -> Result<CompletionResponse> {
///         let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
///         Ok(CompletionResponse::new(Message::assistant(last)))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Completes a conversation with the given messages
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse>;

    /// Short provider name used in logs and status output
    fn name(&self) -> &str {
        "provider"
    }

    /// Sends a system instruction plus a single user prompt and returns
    /// the trimmed reply text
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Provider::complete`]. A reply that is
    /// empty after trimming is reported as a provider error.
    async fn complete_prompt(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let messages = [Message::system(system), Message::user(prompt)];
        let options = CompletionOptions::new(temperature, max_tokens);
        let response = self.complete(&messages, &options).await?;

        if let Some(usage) = response.usage {
            tracing::debug!(
                "{} usage: prompt_tokens={}, completion_tokens={}",
                self.name(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Err(FolioError::Provider(format!("{} returned an empty reply", self.name())).into());
        }
        Ok(text)
    }
}
