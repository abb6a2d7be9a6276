//! Intent classification
//!
//! Decides what kind of turn a normalized question is. Rules are checked in
//! a fixed order and the first match wins:
//!
//! 1. follow-up ("show all", "without limit", ...)
//! 2. casual greeting, only when short and free of data keywords
//! 3. database query (broad keyword set, or a reference to prior results)
//! 4. general question

use crate::chat::context::ConversationState;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Kind of turn a question represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Re-run the previous query without its row limit
    FollowUp,
    /// Greeting, thanks or farewell
    Casual,
    /// Needs SQL against the warehouse
    DatabaseQuery,
    /// General real-estate knowledge
    General,
}

impl Intent {
    /// Stable tag used in logs and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FollowUp => "follow_up",
            Self::Casual => "casual",
            Self::DatabaseQuery => "database_query",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const FOLLOW_UP_PHRASES: &[&str] = &[
    "show all",
    "all results",
    "show everything",
    "full table",
    "complete list",
    "expand",
    "show more",
    "show rest",
    "all rows",
    "entire list",
    "full results",
    "without limit",
    "show complete",
    "all data",
    "everything",
];

const CASUAL_MAX_TOKENS: usize = 5;

/// Keywords that keep a short greeting from being treated as casual
const CASUAL_DATA_GUARD: &[&str] = &[
    "show",
    "list",
    "get",
    "find",
    "properties",
    "noi",
    "data",
    "assets",
];

const DATA_KEYWORDS: &[&str] = &[
    "show", "list", "get", "find", "what", "which", "how many", "how much", "total", "sum",
    "average", "properties", "assets", "funds", "investors", "revenue", "noi", "debt", "equity",
    "performance", "returns", "cities", "table", "column", "schema", "irr", "moic", "occupancy",
    "expenses", "cash flow", "sale", "acquisition", "lender", "borrower", "count", "calculate",
    "analyze", "compare", "filter", "report", "portfolio", "summary", "q1", "q2", "q3", "q4",
    "quarter", "year", "ytd", "monthly", "detail", "overview", "company", "our", "metrics", "kpi",
    "dashboard", "above", "previous", "again", "date", "format", "display", "results", "values",
];

/// Words that point back at the previous result set
const PRIOR_RESULT_REFERENCES: &[&str] = &["above", "previous", "again", "results", "date"];

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhey\b|\bhi\b|\bhello\b|\bgood morning\b|\bgood afternoon\b|\bthanks\b|\bthank you\b|\bbye\b|\bgoodbye\b")
        .expect("valid greeting pattern")
});

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// True when the text asks to expand the previous result
pub fn is_follow_up(lower: &str) -> bool {
    contains_any(lower, FOLLOW_UP_PHRASES)
}

/// True for short greetings that carry no data request
pub fn is_casual(lower: &str) -> bool {
    lower.split_whitespace().count() <= CASUAL_MAX_TOKENS
        && GREETING.is_match(lower)
        && !contains_any(lower, CASUAL_DATA_GUARD)
}

/// True when the text needs a warehouse query
pub fn needs_database(lower: &str, state: &ConversationState) -> bool {
    (state.last_query().is_some() && contains_any(lower, PRIOR_RESULT_REFERENCES))
        || contains_any(lower, DATA_KEYWORDS)
}

/// Classifies a normalized question
///
/// # Examples
///
/// ```
/// use folio::chat::context::ConversationState;
/// use folio::chat::intent::{classify, Intent};
///
/// let state = ConversationState::new(50);
/// assert_eq!(classify("hey", &state), Intent::Casual);
/// assert_eq!(classify("hey show me properties", &state), Intent::DatabaseQuery);
/// assert_eq!(classify("show all results", &state), Intent::FollowUp);
/// assert_eq!(classify("explain cap rates to me", &state), Intent::General);
/// ```
pub fn classify(normalized: &str, state: &ConversationState) -> Intent {
    let lower = normalized.trim().to_lowercase();

    let intent = if is_follow_up(&lower) {
        Intent::FollowUp
    } else if is_casual(&lower) {
        Intent::Casual
    } else if needs_database(&lower, state) {
        Intent::DatabaseQuery
    } else {
        Intent::General
    };

    tracing::debug!("Classified {:?} as {}", normalized, intent);
    intent
}
