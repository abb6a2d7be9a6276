//! SQL resolution
//!
//! Turns a question into SQL either through the template table or by
//! building a [`DelegationRequest`] for the generative step.

use crate::chat::context::ConversationState;
use crate::chat::sql_text::{clean_generated_sql, is_refusal, strip_trailing_order_by};
use crate::chat::templates::{match_template, TemplateMatch};
use crate::config::ChatConfig;
use crate::error::{FolioError, Result};
use crate::prompts::sql_prompt::{generation_prompt, modification_block, SQL_SYSTEM_INSTRUCTION};
use crate::providers::Provider;
use crate::schema::SchemaCatalog;
use tracing::{debug, info, warn};

const SQL_TEMPERATURE: f32 = 0.1;
const SQL_MAX_TOKENS: u32 = 800;

/// Shown when neither path yields usable SQL
pub const RESOLUTION_FAILED: &str =
    "Could not generate a valid SQL query for this question. Try being more specific.";

const REFERENCE_WORDS: &[&str] = &["above", "previous", "those", "these", "last", "again"];
const DATE_FORMAT_WORDS: &[&str] = &["date", "format", "display", "show as date", "readable"];
const SORT_PHRASES: &[&str] = &["with respect to", "sort by", "order by", "based on"];

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Prior query carried into a modification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationContext {
    pub previous_sql: String,
    /// `previous_sql` without its trailing ORDER BY
    pub base_sql: String,
    pub include_date_guidance: bool,
}

/// Everything the generative step needs to write SQL for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationRequest {
    pub question: String,
    pub schema: String,
    pub conversation: Option<String>,
    pub modification: Option<ModificationContext>,
}

impl DelegationRequest {
    /// Renders the full generation prompt
    pub fn render_prompt(&self) -> String {
        let block = self.modification.as_ref().map(|m| {
            modification_block(
                &m.previous_sql,
                &m.base_sql,
                &self.question,
                m.include_date_guidance,
            )
        });
        generation_prompt(
            &self.question,
            block.as_deref(),
            self.conversation.as_deref(),
            &self.schema,
        )
    }
}

/// How a question will get its SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Template { name: &'static str, sql: String },
    Delegate(DelegationRequest),
}

/// Resolves questions to SQL for one session
#[derive(Debug, Clone)]
pub struct SqlResolver {
    schema: String,
    context_turns: usize,
    excerpt_chars: usize,
}

impl SqlResolver {
    /// Creates a resolver over a schema description
    pub fn new(catalog: &SchemaCatalog, settings: &ChatConfig) -> Self {
        Self {
            schema: catalog.describe(),
            context_turns: settings.context_turns,
            excerpt_chars: settings.context_excerpt_chars,
        }
    }

    /// Schema text embedded in delegation requests
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// True when the question modifies the previous query
    pub fn is_context_dependent(question: &str, state: &ConversationState) -> bool {
        if state.last_query().is_none() {
            return false;
        }
        let lower = question.to_lowercase();
        contains_any(&lower, REFERENCE_WORDS)
            || contains_any(&lower, DATE_FORMAT_WORDS)
            || contains_any(&lower, SORT_PHRASES)
    }

    /// Chooses a template or builds a delegation request
    ///
    /// A repeated question skips the template table so the generative step
    /// gets a chance to answer differently.
    pub fn resolve(&self, question: &str, state: &ConversationState, is_repeat: bool) -> Resolution {
        if is_repeat {
            info!("Repeated question, skipping templates");
        } else {
            match match_template(question) {
                Some(TemplateMatch::Sql { name, sql }) => {
                    info!("Template {} matched", name);
                    return Resolution::Template { name, sql };
                }
                Some(TemplateMatch::Declined { name }) => {
                    debug!("Template {} declined, delegating", name);
                }
                None => debug!("No template matched, delegating"),
            }
        }
        Resolution::Delegate(self.delegation_request(question, state))
    }

    fn delegation_request(&self, question: &str, state: &ConversationState) -> DelegationRequest {
        let modification = if Self::is_context_dependent(question, state) {
            state.last_query().map(|previous| ModificationContext {
                previous_sql: previous.to_string(),
                base_sql: strip_trailing_order_by(previous),
                include_date_guidance: contains_any(&question.to_lowercase(), DATE_FORMAT_WORDS),
            })
        } else {
            None
        };

        DelegationRequest {
            question: question.to_string(),
            schema: self.schema.clone(),
            conversation: state.excerpt(self.context_turns, self.excerpt_chars),
            modification,
        }
    }

    /// Asks the provider for SQL and cleans the reply
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Resolution`] when the provider fails, refuses,
    /// or replies with nothing usable.
    pub async fn fulfill(&self, provider: &dyn Provider, request: &DelegationRequest) -> Result<String> {
        let prompt = request.render_prompt();
        let reply = provider
            .complete_prompt(SQL_SYSTEM_INSTRUCTION, &prompt, SQL_TEMPERATURE, SQL_MAX_TOKENS)
            .await
            .map_err(|e| {
                warn!("SQL generation failed: {}", e);
                FolioError::Resolution(RESOLUTION_FAILED.to_string())
            })?;

        if is_refusal(&reply) {
            warn!("Provider declined to write SQL");
            return Err(FolioError::Resolution(RESOLUTION_FAILED.to_string()).into());
        }

        let sql = clean_generated_sql(&reply);
        if sql.is_empty() {
            return Err(FolioError::Resolution(RESOLUTION_FAILED.to_string()).into());
        }
        debug!("Generated SQL: {}", sql);
        Ok(sql)
    }
}
