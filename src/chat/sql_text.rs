//! Textual SQL transforms
//!
//! These are not a SQL parser. A lightweight scan masks string literals,
//! quoted identifiers and comments and tracks parenthesis depth, so that
//! keyword edits only ever apply to the outermost statement. Anything the
//! scan cannot see through (dynamic SQL, unbalanced quotes) is left as is.

use regex::Regex;
use std::sync::LazyLock;

static TOP_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bTOP(?:\s*\(\s*\d+\s*\)|\s+\d+)(?:\s+PERCENT)?(?:\s+WITH\s+TIES)?\s*")
        .expect("valid TOP pattern")
});

static TRAILING_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| {
        Regex::new(r"(?i)(\s*\bLIMIT\s+\d+(?:\s*;)?)[\s#]*$").expect("valid LIMIT pattern")
    });

static ORDER_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bORDER\s+BY\b").expect("valid ORDER BY pattern"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\w+-]*").expect("valid fence pattern"));

/// Stand-in for hidden bytes: neither whitespace nor a word character, so
/// `\s*` and `\b` in the patterns behave as they would around a quote.
const MASK: u8 = b'#';

/// Scan result: a same-length ASCII copy of the SQL with literal, quoted
/// identifier, comment and non-ASCII bytes masked, plus the parenthesis
/// depth at every byte.
///
/// `closed` is false when the text ends inside a literal, a quoted
/// identifier or a comment.
struct Scan {
    masked: String,
    depth: Vec<u32>,
    closed: bool,
}

fn scan(sql: &str) -> Scan {
    #[derive(Clone, Copy, PartialEq)]
    enum Mode {
        Code,
        Single,
        Double,
        Bracket,
        LineComment,
        BlockComment,
    }

    let bytes = sql.as_bytes();
    let mut masked = Vec::with_capacity(bytes.len());
    let mut depth = Vec::with_capacity(bytes.len());
    let mut mode = Mode::Code;
    let mut level: u32 = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        depth.push(level);

        let visible = match mode {
            Mode::Code => match b {
                b'\'' => {
                    mode = Mode::Single;
                    false
                }
                b'"' => {
                    mode = Mode::Double;
                    false
                }
                b'[' => {
                    mode = Mode::Bracket;
                    false
                }
                b'-' if next == Some(b'-') => {
                    mode = Mode::LineComment;
                    false
                }
                b'/' if next == Some(b'*') => {
                    mode = Mode::BlockComment;
                    false
                }
                b'(' => {
                    level += 1;
                    true
                }
                b')' => {
                    level = level.saturating_sub(1);
                    true
                }
                _ => b.is_ascii(),
            },
            Mode::Single => {
                if b == b'\'' {
                    if next == Some(b'\'') {
                        // escaped quote inside the literal
                        masked.extend_from_slice(b"##");
                        depth.push(level);
                        i += 2;
                        continue;
                    }
                    mode = Mode::Code;
                }
                false
            }
            Mode::Double => {
                if b == b'"' {
                    mode = Mode::Code;
                }
                false
            }
            Mode::Bracket => {
                if b == b']' {
                    mode = Mode::Code;
                }
                false
            }
            Mode::LineComment => {
                if b == b'\n' {
                    mode = Mode::Code;
                    true
                } else {
                    false
                }
            }
            Mode::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    masked.extend_from_slice(b"##");
                    depth.push(level);
                    mode = Mode::Code;
                    i += 2;
                    continue;
                }
                false
            }
        };

        masked.push(if visible { b } else { MASK });
        i += 1;
    }

    Scan {
        masked: masked.into_iter().map(char::from).collect(),
        depth,
        closed: mode == Mode::Code,
    }
}

impl Scan {
    fn top_level(&self, start: usize) -> bool {
        self.depth.get(start).copied() == Some(0)
    }

    /// Byte ranges of top-level row-limiting clauses
    fn limit_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges: Vec<(usize, usize)> = TOP_CLAUSE
            .find_iter(&self.masked)
            .filter(|m| self.top_level(m.start()))
            .map(|m| (m.start(), m.end()))
            .collect();

        if let Some(m) = TRAILING_LIMIT.captures(&self.masked).and_then(|c| c.get(1)) {
            if let Some(keyword) = self.masked[m.start()..].find(|c: char| !c.is_whitespace()) {
                if self.top_level(m.start() + keyword) {
                    ranges.push((m.start(), m.end()));
                }
            }
        }
        ranges
    }
}

/// Removes `TOP n`, `TOP (n)` and a trailing `LIMIT n` from the outermost
/// statement
///
/// Limits inside subqueries, string literals, quoted identifiers and
/// comments are left alone. The result is trimmed; applying the function
/// twice gives the same text as applying it once.
///
/// # Examples
///
/// ```
/// use folio::chat::sql_text::remove_row_limits;
///
/// assert_eq!(
///     remove_row_limits("SELECT TOP 5 * FROM DimAsset ORDER BY X"),
///     "SELECT * FROM DimAsset ORDER BY X"
/// );
/// assert_eq!(
///     remove_row_limits("SELECT AssetName FROM DimAsset LIMIT 10"),
///     "SELECT AssetName FROM DimAsset"
/// );
/// ```
pub fn remove_row_limits(sql: &str) -> String {
    let scan = scan(sql);
    let mut ranges = scan.limit_ranges();
    if ranges.is_empty() {
        return sql.trim().to_string();
    }
    ranges.sort_unstable();

    let mut out = String::with_capacity(sql.len());
    let mut cursor = 0;
    for (start, end) in ranges {
        if start < cursor {
            continue;
        }
        out.push_str(&sql[cursor..start]);
        cursor = end;
    }
    out.push_str(&sql[cursor..]);
    out.trim().to_string()
}

/// True when the outermost statement carries a row limit
pub fn has_row_limit(sql: &str) -> bool {
    !scan(sql).limit_ranges().is_empty()
}

/// Cuts the last top-level `ORDER BY` and everything after it
///
/// # Examples
///
/// ```
/// use folio::chat::sql_text::strip_trailing_order_by;
///
/// assert_eq!(
///     strip_trailing_order_by("SELECT * FROM DimAsset ORDER BY AssetName"),
///     "SELECT * FROM DimAsset"
/// );
/// ```
pub fn strip_trailing_order_by(sql: &str) -> String {
    let scan = scan(sql);
    let cut = ORDER_BY
        .find_iter(&scan.masked)
        .filter(|m| scan.top_level(m.start()))
        .last()
        .map(|m| m.start());
    match cut {
        Some(at) => sql[..at].trim().to_string(),
        None => sql.trim().to_string(),
    }
}

/// True when a generated reply refuses the request or is empty
pub fn is_refusal(reply: &str) -> bool {
    let trimmed = reply.trim();
    trimmed.is_empty() || trimmed.to_lowercase().contains("not possible")
}

/// Cleans SQL returned by a generative model
///
/// Removes code fences, one wrapping pair of matching quotes, and every
/// statement after the first `;` that is not inside a string literal. When
/// a literal or comment is left open, the text is cut at the first `;`
/// regardless of quoting.
///
/// # Examples
///
/// ```
/// use folio::chat::sql_text::clean_generated_sql;
///
/// let raw = "```sql\nSELECT * FROM DimFund WHERE FundName = 'A;B'; DROP TABLE DimFund;\n```";
/// assert_eq!(
///     clean_generated_sql(raw),
///     "SELECT * FROM DimFund WHERE FundName = 'A;B'"
/// );
/// ```
pub fn clean_generated_sql(reply: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(reply, "");
    let mut text = unfenced.trim();

    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
            break;
        }
    }

    let scan = scan(text);
    let terminator = if scan.closed {
        scan.masked.find(';')
    } else {
        text.find(';')
    };
    match terminator {
        Some(at) => text[..at].trim().to_string(),
        None => text.trim().to_string(),
    }
}
