//! Spelling normalization for incoming questions

use chrono::{DateTime, Utc};

/// Known misspellings and their corrections, applied in this order
const CORRECTIONS: &[(&str, &str)] = &[
    ("liost", "list"),
    ("lsit", "list"),
    ("lst", "list"),
    ("porofolio", "portfolio"),
    ("portoflio", "portfolio"),
    ("portifolio", "portfolio"),
    ("propertys", "properties"),
    ("proprties", "properties"),
    ("aseets", "assets"),
    ("asets", "assets"),
    ("reveune", "revenue"),
    ("revenu", "revenue"),
    ("expnese", "expense"),
    ("expenes", "expenses"),
    ("hopsitality", "hospitality"),
    ("hopitality", "hospitality"),
    ("multifamly", "multifamily"),
    ("multifmaily", "multifamily"),
    ("qaurter", "quarter"),
    ("quater", "quarter"),
    ("finacial", "financial"),
    ("fianncial", "financial"),
];

/// Corrects known misspellings in `text`
///
/// Replacement is a case-sensitive substring match. An occurrence that is
/// already part of its own correction (`revenu` inside `revenue`) is left
/// alone, which makes the function idempotent.
///
/// # Examples
///
/// ```
/// use folio::chat::normalizer::normalize;
///
/// assert_eq!(normalize("lsit all propertys"), "list all properties");
/// assert_eq!(normalize("total revenu"), "total revenue");
/// assert_eq!(normalize("total revenue"), "total revenue");
/// ```
pub fn normalize(text: &str) -> String {
    CORRECTIONS
        .iter()
        .fold(text.to_string(), |acc, (wrong, right)| {
            replace_outside_correction(&acc, wrong, right)
        })
}

fn replace_outside_correction(text: &str, wrong: &str, right: &str) -> String {
    if !text.contains(wrong) {
        return text.to_string();
    }

    // Offsets at which `wrong` appears inside `right`
    let embedded: Vec<usize> = (0..right.len())
        .filter(|&o| right.is_char_boundary(o) && right[o..].starts_with(wrong))
        .collect();

    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(wrong) {
            let already_correct = embedded.iter().any(|&o| {
                i >= o
                    && text
                        .get(i - o..)
                        .is_some_and(|window| window.starts_with(right))
            });
            if !already_correct {
                out.push_str(right);
                i += wrong.len();
                continue;
            }
        }
        let Some(ch) = rest.chars().next() else {
            break;
        };
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// One user question for one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Text as the user typed it
    pub raw: String,
    /// Text after spelling normalization
    pub normalized: String,
    /// When the question arrived
    pub asked_at: DateTime<Utc>,
}

impl Question {
    /// Normalizes `raw` and stamps the current time
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(raw.trim());
        Self {
            raw,
            normalized,
            asked_at: Utc::now(),
        }
    }
}
