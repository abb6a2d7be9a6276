//! Per-session turn orchestration
//!
//! [`QueryOrchestrator`] drives one chat session: it normalizes and
//! classifies each question, runs the matching handler and always hands
//! back a [`ResponseEnvelope`]. Errors never cross the turn boundary.

use crate::chat::context::ConversationState;
use crate::chat::envelope::ResponseEnvelope;
use crate::chat::insights::InsightSummarizer;
use crate::chat::intent::{classify, Intent};
use crate::chat::normalizer::Question;
use crate::chat::resolver::{Resolution, SqlResolver};
use crate::chat::sql_text::{has_row_limit, remove_row_limits};
use crate::config::ChatConfig;
use crate::database::{DatabaseExecutor, QueryResult, ScopedConnection};
use crate::error::{ErrorKind, FolioError, Result};
use crate::prompts::analyst_prompt::{general_prompt, GENERAL_SYSTEM_INSTRUCTION};
use crate::prompts::casual_reply;
use crate::providers::Provider;
use crate::schema::SchemaCatalog;
use tracing::{debug, info, warn};

const GENERAL_TEMPERATURE: f32 = 0.5;
const GENERAL_MAX_TOKENS: u32 = 400;

/// Advisory attached to a successful query that returned no rows
pub const NO_DATA_MESSAGE: &str = "No data found for your query. The database might not contain the specific information you're looking for, or the filters might be too restrictive.";

/// Where the orchestrator is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Classifying,
    RunningFollowUp,
    RunningCasual,
    RunningQuery,
    RunningGeneral,
    Responding,
}

/// Drives the turns of one chat session
///
/// The orchestrator owns its provider, executor and conversation state.
/// `handle_turn` takes `&mut self`, so turns of one session are processed
/// one at a time.
pub struct QueryOrchestrator {
    provider: Box<dyn Provider>,
    executor: Box<dyn DatabaseExecutor>,
    resolver: SqlResolver,
    summarizer: InsightSummarizer,
    state: ConversationState,
    settings: ChatConfig,
    phase: TurnPhase,
}

impl QueryOrchestrator {
    /// Creates an orchestrator for a new session
    ///
    /// # Arguments
    ///
    /// * `provider` - Generative text capability for SQL, insights and general answers
    /// * `executor` - Warehouse access; connected once per query
    /// * `catalog` - Schema description embedded in generation prompts
    /// * `settings` - Chat tuning knobs
    pub fn new(
        provider: Box<dyn Provider>,
        executor: Box<dyn DatabaseExecutor>,
        catalog: &SchemaCatalog,
        settings: ChatConfig,
    ) -> Self {
        Self {
            provider,
            executor,
            resolver: SqlResolver::new(catalog, &settings),
            summarizer: InsightSummarizer::new(settings.insight_sample_rows),
            state: ConversationState::new(settings.max_transcript_turns),
            settings,
            phase: TurnPhase::Idle,
        }
    }

    /// Session context
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Current phase; `Idle` whenever no turn is in progress
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Name of the provider in use
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Forgets the last query and the transcript
    pub fn reset_session(&mut self) {
        self.state.reset();
        self.phase = TurnPhase::Idle;
        info!(session = %self.state.session_id(), "Session reset");
    }

    /// Processes one question and returns its envelope
    ///
    /// Never fails: every error is reported on the envelope with
    /// `success == false`.
    pub async fn handle_turn(&mut self, raw: &str) -> ResponseEnvelope {
        let question = Question::new(raw);
        let text = question.normalized.as_str();

        self.phase = TurnPhase::Classifying;
        let is_repeat = self
            .state
            .is_recent_user_turn(text, self.settings.repeat_window);
        self.state.record_user_turn(text);
        let intent = classify(text, &self.state);
        info!("Handling {} turn", intent);

        let outcome = match intent {
            Intent::FollowUp => {
                self.phase = TurnPhase::RunningFollowUp;
                self.run_follow_up(text).await
            }
            Intent::Casual => {
                self.phase = TurnPhase::RunningCasual;
                Ok(ResponseEnvelope::answered(text, intent, casual_reply(text)))
            }
            Intent::DatabaseQuery => {
                self.phase = TurnPhase::RunningQuery;
                self.run_query(text, is_repeat).await
            }
            Intent::General => {
                self.phase = TurnPhase::RunningGeneral;
                self.run_general(text).await
            }
        };

        self.phase = TurnPhase::Responding;
        let envelope = match outcome {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Turn failed: {}", e);
                ResponseEnvelope::from_error(text, intent, &e)
            }
        };
        self.phase = TurnPhase::Idle;
        envelope
    }

    /// Runs SQL on a connection scoped to this call
    fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        debug!("Executing SQL: {}", sql);
        let mut conn = ScopedConnection::open(self.executor.as_mut())?;
        conn.execute(sql)
    }

    async fn run_follow_up(&mut self, text: &str) -> Result<ResponseEnvelope> {
        let Some(previous) = self.state.last_query() else {
            return Err(FolioError::NoPriorQuery.into());
        };
        let expanded = remove_row_limits(previous);
        let previous_question = self.state.last_question().unwrap_or_default().to_string();
        info!("Expanding previous query without row limits");

        let result = match self.execute(&expanded) {
            Ok(result) => result,
            Err(e) => {
                return Ok(ResponseEnvelope::from_error(text, Intent::FollowUp, &e).attempted(expanded))
            }
        };

        let rows = result.row_count();
        let mut insights = format!(
            "Showing complete results for your previous question: '{}'. Found {} total rows.",
            previous_question, rows
        );
        if rows > self.settings.large_result_rows {
            insights.push_str(&format!(
                "\n\nLarge dataset: this query returned {} rows. All data is included below.",
                rows
            ));
        }

        self.state
            .set_last_query(previous_question, expanded.clone(), result.clone());
        Ok(ResponseEnvelope::with_query(
            text,
            Intent::FollowUp,
            expanded,
            result,
            insights,
        ))
    }

    async fn run_query(&mut self, text: &str, is_repeat: bool) -> Result<ResponseEnvelope> {
        let sql = match self.resolver.resolve(text, &self.state, is_repeat) {
            Resolution::Template { sql, .. } => sql,
            Resolution::Delegate(request) => {
                info!("Delegating SQL generation to {}", self.provider.name());
                self.resolver
                    .fulfill(self.provider.as_ref(), &request)
                    .await?
            }
        };

        let result = match self.execute(&sql) {
            Ok(result) => result,
            Err(e) => {
                return Ok(
                    ResponseEnvelope::from_error(text, Intent::DatabaseQuery, &e).attempted(sql)
                )
            }
        };

        let rows = result.row_count();
        self.state.set_last_query(text, sql.clone(), result.clone());
        self.state
            .record_assistant_turn(format!("Query returned {} results from {}", rows, text));
        info!("Query returned {} rows", rows);

        if result.is_empty() {
            return Ok(ResponseEnvelope::with_query(
                text,
                Intent::DatabaseQuery,
                sql,
                result,
                NO_DATA_MESSAGE,
            ));
        }

        let mut insights = self
            .summarizer
            .summarize(self.provider.as_ref(), text, &result)
            .await;
        if has_row_limit(&sql) && rows >= self.settings.limited_result_tip_rows {
            insights.push_str(&format!(
                "\n\nTip: This shows the first {} results. Ask 'show all results' to see everything!",
                rows
            ));
        }

        Ok(ResponseEnvelope::with_query(
            text,
            Intent::DatabaseQuery,
            sql,
            result,
            insights,
        ))
    }

    async fn run_general(&mut self, text: &str) -> Result<ResponseEnvelope> {
        match self
            .provider
            .complete_prompt(
                GENERAL_SYSTEM_INSTRUCTION,
                &general_prompt(text),
                GENERAL_TEMPERATURE,
                GENERAL_MAX_TOKENS,
            )
            .await
        {
            Ok(reply) => Ok(ResponseEnvelope::answered(text, Intent::General, reply)),
            Err(e) => Ok(ResponseEnvelope::failure(
                text,
                Intent::General,
                ErrorKind::GeneralFailure,
                format!("Could not process general question: {}", e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteExecutor;
    use crate::providers::{CompletionOptions, CompletionResponse, Message};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replies in order; fails once the script runs out
    struct ScriptedProvider {
        replies: Mutex<VecDeque<String>>,
        calls: Arc<Mutex<Vec<(String, f32)>>>,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn complete(
            &self,
            messages: &[Message],
            options: &CompletionOptions,
        ) -> Result<CompletionResponse> {
            self.calls.lock().unwrap().push((
                messages.last().map(|m| m.content.clone()).unwrap_or_default(),
                options.temperature,
            ));
            match self.replies.lock().unwrap().pop_front() {
                Some(reply) => Ok(CompletionResponse::new(Message::assistant(reply))),
                None => Err(FolioError::Provider("no scripted reply".into()).into()),
            }
        }
    }

    /// Returns a fixed result and records executed SQL
    struct FakeExecutor {
        result: Option<QueryResult>,
        executed: Arc<Mutex<Vec<String>>>,
        connected: bool,
    }

    impl DatabaseExecutor for FakeExecutor {
        fn connect(&mut self) -> Result<()> {
            self.connected = true;
            Ok(())
        }

        fn execute(&mut self, sql: &str) -> Result<QueryResult> {
            assert!(self.connected, "execute called without a connection");
            self.executed.lock().unwrap().push(sql.to_string());
            self.result
                .clone()
                .ok_or_else(|| FolioError::Execution("Query execution failed. Please check the query syntax.".into()).into())
        }

        fn close(&mut self) {
            self.connected = false;
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    struct Harness {
        orchestrator: QueryOrchestrator,
        executed: Arc<Mutex<Vec<String>>>,
        calls: Arc<Mutex<Vec<(String, f32)>>>,
    }

    fn harness(replies: &[&str], result: Option<QueryResult>) -> Harness {
        let executed = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = ScriptedProvider {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Arc::clone(&calls),
        };
        let executor = FakeExecutor {
            result,
            executed: Arc::clone(&executed),
            connected: false,
        };
        Harness {
            orchestrator: QueryOrchestrator::new(
                Box::new(provider),
                Box::new(executor),
                &SchemaCatalog::default(),
                ChatConfig::default(),
            ),
            executed,
            calls,
        }
    }

    fn rows(n: usize) -> QueryResult {
        QueryResult::new(
            vec!["AssetName".into()],
            (0..n).map(|i| vec![json!(format!("Asset {}", i))]).collect(),
        )
    }

    #[tokio::test]
    async fn test_casual_turn_runs_nothing() {
        let mut h = harness(&[], Some(rows(1)));
        let envelope = h.orchestrator.handle_turn("hey").await;
        assert!(envelope.success);
        assert_eq!(envelope.intent, Intent::Casual);
        assert!(envelope.sql_query.is_none());
        assert!(h.executed.lock().unwrap().is_empty());
        assert!(h.calls.lock().unwrap().is_empty());
        assert_eq!(h.orchestrator.phase(), TurnPhase::Idle);
    }

    #[tokio::test]
    async fn test_follow_up_without_prior_query() {
        let mut h = harness(&[], Some(rows(1)));
        let envelope = h.orchestrator.handle_turn("show all results").await;
        assert!(!envelope.success);
        assert_eq!(envelope.error_kind, Some(ErrorKind::NoPriorQuery));
        assert!(envelope.error.unwrap().contains("No previous query"));
        assert_eq!(h.orchestrator.phase(), TurnPhase::Idle);
    }

    #[tokio::test]
    async fn test_template_query_then_follow_up() {
        let mut h = harness(&["Strong performers."], Some(rows(3)));

        let first = h.orchestrator.handle_turn("top 3 performing assets").await;
        assert!(first.success);
        assert!(first.sql_query.as_deref().unwrap().starts_with("SELECT TOP 3 "));
        assert_eq!(first.insights, "Strong performers.");
        assert_eq!(
            h.orchestrator.state().last_question(),
            Some("top 3 performing assets")
        );

        let second = h.orchestrator.handle_turn("show all results").await;
        assert!(second.success);
        let expanded = second.sql_query.unwrap();
        assert!(expanded.starts_with("SELECT a.AssetName"));
        assert!(!expanded.contains("TOP"));
        assert!(second
            .insights
            .starts_with("Showing complete results for your previous question: 'top 3 performing assets'. Found 3 total rows."));
        assert_eq!(h.orchestrator.state().last_query(), Some(expanded.as_str()));
        assert_eq!(h.executed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_large_follow_up_note() {
        let mut h = harness(&["ok"], Some(rows(51)));
        h.orchestrator.handle_turn("list multifamily").await;
        let envelope = h.orchestrator.handle_turn("show everything").await;
        assert!(envelope.insights.contains("Large dataset: this query returned 51 rows"));
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let mut h = harness(&[], Some(QueryResult::default()));
        let envelope = h.orchestrator.handle_turn("list hospitality assets").await;
        assert!(envelope.success);
        assert_eq!(envelope.row_count, 0);
        assert_eq!(envelope.insights, NO_DATA_MESSAGE);
        assert!(h.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execution_failure_keeps_state() {
        let mut h = harness(&[], None);
        let envelope = h.orchestrator.handle_turn("what cities are we in").await;
        assert!(!envelope.success);
        assert_eq!(envelope.error_kind, Some(ErrorKind::ExecutionFailure));
        assert!(envelope.sql_query.is_some());
        assert!(h.orchestrator.state().last_query().is_none());
        assert_eq!(h.orchestrator.state().len(), 1);
    }

    #[tokio::test]
    async fn test_limited_result_tip() {
        let mut h = harness(&["Insight."], Some(rows(10)));
        let envelope = h.orchestrator.handle_turn("properties with high noi").await;
        assert!(envelope
            .insights
            .ends_with("Tip: This shows the first 10 results. Ask 'show all results' to see everything!"));
    }

    #[tokio::test]
    async fn test_repeat_routes_to_delegation() {
        let mut h = harness(
            &["first insight", "SELECT AssetName FROM DimAsset", "second insight"],
            Some(rows(2)),
        );
        h.orchestrator.handle_turn("what cities are we in").await;
        let envelope = h.orchestrator.handle_turn("What cities are we in").await;
        assert!(envelope.success);
        assert_eq!(envelope.sql_query.as_deref(), Some("SELECT AssetName FROM DimAsset"));
        let calls = h.calls.lock().unwrap();
        assert_eq!(calls[1].1, 0.1);
    }

    #[tokio::test]
    async fn test_resolution_failure() {
        let mut h = harness(&["not possible"], Some(rows(1)));
        let envelope = h.orchestrator.handle_turn("what is the weather in our portfolio").await;
        assert!(!envelope.success);
        assert_eq!(envelope.error_kind, Some(ErrorKind::ResolutionFailure));
        assert!(h.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_general_question_and_failure() {
        let mut h = harness(&["Cap rate is NOI over value."], Some(rows(1)));
        let envelope = h.orchestrator.handle_turn("explain cap rates").await;
        assert!(envelope.success);
        assert_eq!(envelope.intent, Intent::General);
        assert_eq!(envelope.sql_display(), "No database query needed");

        let envelope = h.orchestrator.handle_turn("explain cap rate compression").await;
        assert!(!envelope.success);
        assert!(envelope
            .error
            .unwrap()
            .starts_with("Could not process general question:"));
    }

    #[tokio::test]
    async fn test_templates_run_against_sqlite_warehouse() {
        let dir = crate::test_utils::temp_dir();
        let path = crate::test_utils::seed_warehouse(&dir);
        let provider = ScriptedProvider {
            replies: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        let mut orchestrator = QueryOrchestrator::new(
            Box::new(provider),
            Box::new(SqliteExecutor::new(path, true)),
            &SchemaCatalog::default(),
            ChatConfig::default(),
        );

        let cases = [
            ("total equity for each fund", 2),
            ("what cities are we in", 3),
            ("what is our total debt", 1),
            ("list multifamily", 2),
            ("show hospitality assets", 1),
            ("what property types do we have", 3),
            ("properties with high noi", 4),
            ("list assets by acquisition price", 4),
            ("show me all properties", 4),
        ];
        for (question, expected) in cases {
            let envelope = orchestrator.handle_turn(question).await;
            assert!(envelope.success, "{}: {:?}", question, envelope.error);
            assert_eq!(envelope.row_count, expected, "{}", question);
        }

        let top = orchestrator.handle_turn("top 2 performing assets").await;
        assert_eq!(top.row_count, 2);
        assert_eq!(top.data.record(0).unwrap()["AssetName"], json!("Bayview Suites"));
        assert!(top
            .insights
            .starts_with("Query executed successfully and returned 2 results"));

        let expanded = orchestrator.handle_turn("show all results").await;
        assert!(expanded.success);
        assert_eq!(expanded.row_count, 4);
    }

    #[tokio::test]
    async fn test_reset_session() {
        let mut h = harness(&["ok"], Some(rows(1)));
        h.orchestrator.handle_turn("list multifamily").await;
        assert!(h.orchestrator.state().last_query().is_some());
        h.orchestrator.reset_session();
        assert!(h.orchestrator.state().last_query().is_none());
        assert!(h.orchestrator.state().is_empty());
    }
}
