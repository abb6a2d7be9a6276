//! Per-session conversation context
//!
//! Holds the last successfully executed query, its result, the question that
//! produced it and a bounded transcript of turns. One instance belongs to
//! one chat session; it is not shared across threads.

use crate::database::QueryResult;
use std::collections::VecDeque;
use uuid::Uuid;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Mutable context of a single chat session
///
/// `last_query` is `Some` exactly when the most recent database turn
/// executed successfully; failed executions never touch it.
///
/// # Examples
///
/// ```
/// use folio::chat::context::ConversationState;
/// use folio::database::QueryResult;
///
/// let mut state = ConversationState::new(50);
/// state.record_user_turn("list funds");
/// state.set_last_query("list funds", "SELECT FundName FROM DimFund", QueryResult::default());
///
/// assert_eq!(state.last_query(), Some("SELECT FundName FROM DimFund"));
/// assert!(state.is_recent_user_turn("  List   FUNDS ", 5));
///
/// state.reset();
/// assert!(state.last_query().is_none());
/// assert!(state.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConversationState {
    session_id: Uuid,
    last_sql: Option<String>,
    last_result: Option<QueryResult>,
    last_question: Option<String>,
    transcript: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl ConversationState {
    /// Creates an empty state keeping at most `capacity` transcript turns
    pub fn new(capacity: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            last_sql: None,
            last_result: None,
            last_question: None,
            transcript: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Identifier of the current session; a reset starts a new one
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Appends a user turn
    pub fn record_user_turn(&mut self, text: impl Into<String>) {
        self.push(Role::User, text.into());
    }

    /// Appends an assistant turn
    pub fn record_assistant_turn(&mut self, summary: impl Into<String>) {
        self.push(Role::Assistant, summary.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.transcript.push_back(ConversationTurn { role, content });
        while self.transcript.len() > self.capacity {
            self.transcript.pop_front();
        }
    }

    /// Records a successfully executed query
    pub fn set_last_query(
        &mut self,
        question: impl Into<String>,
        sql: impl Into<String>,
        result: QueryResult,
    ) {
        self.last_question = Some(question.into());
        self.last_sql = Some(sql.into());
        self.last_result = Some(result);
    }

    /// SQL of the last successful query
    pub fn last_query(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    /// Result of the last successful query
    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    /// Question that produced the last successful query
    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    /// Full transcript, oldest first
    pub fn transcript(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.transcript.iter()
    }

    /// The last `n` turns, oldest first
    pub fn recent_turns(&self, n: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.transcript
            .iter()
            .skip(self.transcript.len().saturating_sub(n))
    }

    /// True when `text` equals one of the last `k` user turns, ignoring case
    /// and whitespace differences
    pub fn is_recent_user_turn(&self, text: &str, k: usize) -> bool {
        let wanted = canonical(text);
        self.transcript
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .take(k)
            .any(|turn| canonical(&turn.content) == wanted)
    }

    /// Renders the last `turns` entries for a generation prompt
    ///
    /// Returns `None` until the transcript holds more than one turn. Each
    /// entry is cut to `max_chars` characters.
    pub fn excerpt(&self, turns: usize, max_chars: usize) -> Option<String> {
        if self.transcript.len() <= 1 {
            return None;
        }
        let lines: Vec<String> = self
            .recent_turns(turns)
            .map(|turn| format!("{}: {}", turn.role, truncate_string(&turn.content, max_chars)))
            .collect();
        Some(format!("Recent conversation:\n{}", lines.join("\n")))
    }

    /// Number of transcript turns
    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Clears every field and the transcript
    pub fn reset(&mut self) {
        self.session_id = Uuid::new_v4();
        self.last_sql = None;
        self.last_result = None;
        self.last_question = None;
        self.transcript.clear();
    }
}

fn canonical(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Truncates a string to a maximum length, adding ellipsis if truncated
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut truncated = s.chars().take(max_len.saturating_sub(3)).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}
