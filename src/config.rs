//! Configuration management for Folio
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, FolioError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Folio
///
/// Holds the generative provider settings, the warehouse location, the
/// data-model document location and the chat session tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration (OpenAI, Ollama)
    pub provider: ProviderConfig,
    /// Warehouse connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Data-model document settings
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Chat session behavior
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Provider configuration
///
/// Specifies which generative provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI-compatible provider configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI-compatible chat completions configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Model to request
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API base URL (without the `/chat/completions` suffix)
    ///
    /// Overridable so tests can point the provider at a mock server.
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// API key; usually supplied through `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// HTTP timeout for a single completion (seconds)
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
}

fn default_openai_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_provider_timeout() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_base: default_openai_api_base(),
            api_key: None,
            timeout_seconds: default_provider_timeout(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// HTTP timeout for a single completion (seconds)
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u64,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            timeout_seconds: default_provider_timeout(),
        }
    }
}

/// Warehouse connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite warehouse file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Open the warehouse read-only
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/portfolio.db")
}

fn default_read_only() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            read_only: default_read_only(),
        }
    }
}

/// Data-model document configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Path to the JSON data-model document
    ///
    /// When unset or unreadable, a minimal generic description is used.
    #[serde(default)]
    pub data_model_path: Option<PathBuf>,
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Number of recent user turns checked for a repeated question
    #[serde(default = "default_repeat_window")]
    pub repeat_window: usize,

    /// Maximum transcript turns kept by a session
    #[serde(default = "default_max_transcript_turns")]
    pub max_transcript_turns: usize,

    /// Transcript turns included in a delegation request
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,

    /// Characters kept from each transcript turn in a delegation request
    #[serde(default = "default_context_excerpt_chars")]
    pub context_excerpt_chars: usize,

    /// Rows sampled into the insight digest
    #[serde(default = "default_insight_sample_rows")]
    pub insight_sample_rows: usize,

    /// Row count above which a follow-up adds the large dataset note
    #[serde(default = "default_large_result_rows")]
    pub large_result_rows: usize,

    /// Row count at which a row-limited result suggests "show all results"
    #[serde(default = "default_limited_result_tip_rows")]
    pub limited_result_tip_rows: usize,
}

fn default_repeat_window() -> usize {
    5
}

fn default_max_transcript_turns() -> usize {
    50
}

fn default_context_turns() -> usize {
    4
}

fn default_context_excerpt_chars() -> usize {
    100
}

fn default_insight_sample_rows() -> usize {
    2
}

fn default_large_result_rows() -> usize {
    50
}

fn default_limited_result_tip_rows() -> usize {
    10
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            repeat_window: default_repeat_window(),
            max_transcript_turns: default_max_transcript_turns(),
            context_turns: default_context_turns(),
            context_excerpt_chars: default_context_excerpt_chars(),
            insight_sample_rows: default_insight_sample_rows(),
            large_result_rows: default_large_result_rows(),
            limited_result_tip_rows: default_limited_result_tip_rows(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            database: DatabaseConfig::default(),
            schema: SchemaConfig::default(),
            chat: ChatConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FolioError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| FolioError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("FOLIO_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("FOLIO_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("FOLIO_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            if !api_key.trim().is_empty() {
                self.provider.openai.api_key = Some(api_key);
            }
        }

        if let Ok(ollama_host) = std::env::var("FOLIO_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("FOLIO_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Warehouse and data model
        if let Ok(db_path) = std::env::var("FOLIO_DATABASE_PATH") {
            self.database.path = PathBuf::from(db_path);
        }

        if let Ok(model_path) = std::env::var("FOLIO_DATA_MODEL_PATH") {
            self.schema.data_model_path = Some(PathBuf::from(model_path));
        }

        // Chat overrides
        if let Ok(window) = std::env::var("FOLIO_REPEAT_WINDOW") {
            if let Ok(value) = window.parse() {
                self.chat.repeat_window = value;
            } else {
                tracing::warn!("Invalid FOLIO_REPEAT_WINDOW: {}", window);
            }
        }

        if let Ok(max_turns) = std::env::var("FOLIO_MAX_TRANSCRIPT_TURNS") {
            if let Ok(value) = max_turns.parse() {
                self.chat.max_transcript_turns = value;
            } else {
                tracing::warn!("Invalid FOLIO_MAX_TRANSCRIPT_TURNS: {}", max_turns);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(db_path) = &cli.database {
            tracing::debug!("Using database override from CLI: {}", db_path.display());
            self.database.path = db_path.clone();
        }

        if let Some(model_path) = &cli.data_model {
            self.schema.data_model_path = Some(model_path.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(FolioError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(FolioError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.provider.openai.timeout_seconds == 0 {
            return Err(FolioError::Config(
                "provider.openai.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.ollama.timeout_seconds == 0 {
            return Err(FolioError::Config(
                "provider.ollama.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(FolioError::Config("database.path cannot be empty".to_string()).into());
        }

        if self.chat.max_transcript_turns == 0 {
            return Err(FolioError::Config(
                "chat.max_transcript_turns must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.repeat_window > self.chat.max_transcript_turns {
            return Err(FolioError::Config(
                "chat.repeat_window must not exceed chat.max_transcript_turns".to_string(),
            )
            .into());
        }

        if self.chat.context_excerpt_chars < 4 {
            return Err(FolioError::Config(
                "chat.context_excerpt_chars must be at least 4".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
