//! Narrative prompts and canned replies
//!
//! Instructions for business-insight narration and general questions, plus
//! the fixed replies used for greetings.

use regex::Regex;
use std::sync::LazyLock;

/// System instruction for insight narration
pub const INSIGHTS_SYSTEM_INSTRUCTION: &str =
    "You are a senior real estate analyst providing strategic insights.";

/// System instruction for general questions
pub const GENERAL_SYSTEM_INSTRUCTION: &str = "You are a helpful real estate portfolio assistant.";

/// Guidance appended to every insight request
pub const BUSINESS_INSIGHTS_PROMPT: &str = "Write 2-4 short paragraphs of business insight for an \
asset manager. Lead with the direct answer, then call out notable values, concentrations or \
outliers visible in the sample, and finish with one practical recommendation. Use plain numbers \
with thousands separators and do not invent figures that are not in the results.";

/// Default reply when a greeting has no specific canned answer
pub const DEFAULT_CASUAL_REPLY: &str = "Hello! I'm your Real Estate AI assistant. I can help you analyze your portfolio of 12 properties across different sectors. What would you like to know?";

/// Builds the user prompt for a general question
pub fn general_prompt(question: &str) -> String {
    format!(
        "User asked: \"{question}\"

This is a general question about real estate portfolio management. Provide a helpful response
based on real estate knowledge and mention that specific portfolio data is available if needed.

Available data includes properties, funds, investors, performance metrics, and financial data."
    )
}

/// Builds the user prompt for insight narration from a result digest
pub fn insights_prompt(question: &str, digest: &str) -> String {
    format!("User asked: \"{question}\"\n\nQuery results: {digest}\n\n{BUSINESS_INSIGHTS_PROMPT}")
}

struct CannedReply {
    pattern: Regex,
    reply: &'static str,
}

fn canned(pattern: &str, reply: &'static str) -> CannedReply {
    CannedReply {
        pattern: Regex::new(pattern).expect("valid greeting pattern"),
        reply,
    }
}

static CANNED_REPLIES: LazyLock<Vec<CannedReply>> = LazyLock::new(|| {
    vec![
        canned(
            r"\bthank you\b|\bthanks\b",
            "You're welcome! Let me know if you want to dig into anything else in the portfolio.",
        ),
        canned(
            r"\bgood morning\b",
            "Good morning! Ready to review the portfolio? Ask about properties, funds, debt or performance.",
        ),
        canned(
            r"\bgood afternoon\b",
            "Good afternoon! What would you like to know about the portfolio today?",
        ),
        canned(
            r"\bgoodbye\b|\bbye\b",
            "Goodbye! Come back any time you need portfolio numbers.",
        ),
        canned(
            r"\bhello\b|\bhey\b|\bhi\b",
            "Hi there! I can list properties, summarize fund equity, total up debt and compare asset performance. What would you like to see?",
        ),
    ]
});

/// Picks the canned reply for a casual message
///
/// # Examples
///
/// ```
/// use folio::prompts::analyst_prompt::{casual_reply, DEFAULT_CASUAL_REPLY};
///
/// assert!(casual_reply("thanks!").starts_with("You're welcome"));
/// assert_eq!(casual_reply("yo"), DEFAULT_CASUAL_REPLY);
/// ```
pub fn casual_reply(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    CANNED_REPLIES
        .iter()
        .find(|c| c.pattern.is_match(&lower))
        .map_or(DEFAULT_CASUAL_REPLY, |c| c.reply)
}
