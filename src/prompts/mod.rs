//! Prompt text for the generative steps
//!
//! This module holds the instructions sent with SQL generation, insight
//! narration and general questions, along with the canned greeting replies
//! and the sample questions offered to new users.

pub mod analyst_prompt;
pub mod sql_prompt;

pub use analyst_prompt::{casual_reply, DEFAULT_CASUAL_REPLY};

/// Questions offered to users who are not sure what to ask
///
/// # Examples
///
/// ```
/// use folio::prompts::sample_questions;
///
/// let questions = sample_questions();
/// assert_eq!(questions.len(), 10);
/// assert!(questions.contains(&"What is our total outstanding debt?"));
/// ```
pub fn sample_questions() -> &'static [&'static str] {
    &[
        "Hey, what can you help me with?",
        "Show me all properties in our portfolio",
        "What property types do we have?",
        "What cities do we have properties in?",
        "List all multifamily properties",
        "Show me hospitality properties",
        "Give me total equity for each fund",
        "What is our total outstanding debt?",
        "Show me properties with high NOI",
        "List properties by acquisition price",
    ]
}
