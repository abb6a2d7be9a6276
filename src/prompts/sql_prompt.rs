//! SQL generation prompt
//!
//! Text blocks sent with a delegated SQL generation request. The schema
//! section is rendered from the data-model document; everything else here
//! is fixed guidance for the T-SQL warehouse dialect.

/// System instruction for SQL generation
pub const SQL_SYSTEM_INSTRUCTION: &str = "You are an expert SQL developer for real estate databases. Return only clean SQL queries without any formatting or explanations.";

/// Preamble placed ahead of the schema description
pub const BASE_SYSTEM_PROMPT: &str = "You are a real estate portfolio analyst with direct access to the \
company's data warehouse. Answer questions by writing a single read-only SQL Server query against \
the tables described below.\n\n";

/// Constraints every generated query must satisfy
pub const SQL_GENERATION_RULES: &str = "SQL GENERATION RULES:
- Write exactly one SELECT statement; never modify data (no INSERT, UPDATE, DELETE, DROP, ALTER).
- Use SQL Server syntax: TOP n instead of LIMIT, GETDATE() for the current date.
- Join fact tables to dimensions on their surrogate keys (AssetID, FundID, InvestorID).
- Qualify columns with table aliases whenever more than one table is referenced.
- Alias every aggregate with a readable name (SUM(ao.NetOperatingIncome) AS TotalNOI).
- Filter debt to DebtStatus = 'Current' unless the user asks for historical loans.
- Every column in SELECT that is not aggregated must appear in GROUP BY.
- Always close string literals with matching quotes.
- If the question cannot be answered from the schema, reply with: not possible.";

/// Rules for questions that build on earlier turns
pub const CONTEXT_AWARE_SQL_RULES: &str = "CONTEXT RULES:
- \"above\", \"previous\", \"those\" and \"these\" refer to the rows of the last query.
- When refining a previous query keep its SELECT list, JOINs and WHERE clauses unless told otherwise.
- A request to sort changes only the ORDER BY clause.
- A request to filter adds predicates to the existing WHERE clause.";

/// Date handling for integer date keys
pub const DATE_KEY_RULES: &str = "DATE KEYS:
- Fact tables store dates as integer keys in YYYYMMDD form (ReportingDateKey, IssuanceDateKey, MaturityDateKey).
- Quarter filters: Q1 = 0101-0331, Q2 = 0401-0630, Q3 = 0701-0930, Q4 = 1001-1231 of the requested year.
- Year-to-date: ReportingDateKey BETWEEN <year>0101 AND the latest available key.
- Yearly totals: GROUP BY ReportingDateKey / 10000.";

/// Aggregation guidance for operations and investment facts
pub const AGGREGATION_RULES: &str = "AGGREGATION RULES:
- Revenue, expenses and NOI are additive: use SUM over the reporting period.
- Occupancy and interest rates are ratios: use AVG, never SUM.
- Valuations and balances are point-in-time: take the latest ReportingDateKey per asset.";

/// Fixed-phrase sort targets mapped to warehouse columns
///
/// Each entry lists the phrases a user might say and the column they mean.
pub const SORT_COLUMN_MAPPINGS: &[(&[&str], &str)] = &[
    (&["current value", "valuation", "value"], "CurrentValuation"),
    (&["price", "acquisition price"], "AcquisitionPrice"),
    (&["size", "square footage"], "TotalSquareFootage"),
    (&["units", "number of units"], "NumberOfUnits"),
    (&["date", "acquisition date"], "AcquisitionDate"),
    (&["name", "property name"], "AssetName"),
    (&["type"], "PropertyType"),
    (&["city"], "City"),
    (&["state"], "State"),
];

/// Renders the column mapping table as prompt lines
pub fn column_mapping_lines() -> String {
    SORT_COLUMN_MAPPINGS
        .iter()
        .map(|(phrases, column)| {
            let quoted: Vec<String> = phrases.iter().map(|p| format!("\"{}\"", p)).collect();
            format!("- {} -> Use {}", quoted.join(", "), column)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the modification block for a context-dependent question
///
/// `base_sql` is the previous query with its trailing ORDER BY removed.
pub fn modification_block(
    previous_sql: &str,
    base_sql: &str,
    question: &str,
    include_date_guidance: bool,
) -> String {
    let mut block = format!(
        "IMPORTANT: The user is asking to modify the previous query results.
Previous full query was: {previous_sql}
Base query without ORDER BY: {base_sql}

User's new request: {question}

Context-Dependent Query Rules:
1. If user says \"above list\" or \"previous results\", they mean the data from the last query
2. If user says \"with respect to X\" or \"sort by X\", add ORDER BY X to the base query
3. Keep ALL existing columns, JOINs, WHERE clauses intact - only modify ORDER BY

Column Mapping for Sorting:
{mapping}

Generate the COMPLETE query with the new ORDER BY clause, never a fragment.
Example: base query SELECT * FROM DimAsset and request \"sort by price value\"
gives SELECT * FROM DimAsset ORDER BY AcquisitionPrice DESC
",
        mapping = column_mapping_lines()
    );

    if include_date_guidance {
        block.push_str(
            "
Date formatting:
1. Keep the existing JOINs and base structure
2. Convert integer date keys (IssuanceDateKey, MaturityDateKey) to readable dates
3. Use CONVERT(DATE, CONVERT(VARCHAR(8), DateKey), 112) AS DateFieldName
4. Example: CONVERT(DATE, CONVERT(VARCHAR(8), IssuanceDateKey), 112) AS IssuanceDate
5. Replace the integer date columns with the formatted columns in the SELECT clause
",
        );
    }

    block
}

/// Assembles the full generation prompt
pub fn generation_prompt(
    question: &str,
    modification: Option<&str>,
    conversation: Option<&str>,
    schema: &str,
) -> String {
    let mut prompt = format!("Generate a SQL Server query for: \"{}\"\n\n", question);

    if let Some(block) = modification {
        prompt.push_str("This is a MODIFICATION of a previous query. Use the base query below and change only what is asked.\n\n");
        prompt.push_str(block);
        prompt.push('\n');
    }

    if let Some(conversation) = conversation {
        prompt.push_str(conversation);
        prompt.push_str("\n\n");
    }

    for section in [
        SQL_GENERATION_RULES,
        CONTEXT_AWARE_SQL_RULES,
        "For several property types use WHERE PropertyType IN ('Commercial', 'Hospitality') or UNION.",
    ] {
        prompt.push_str(section);
        prompt.push_str("\n\n");
    }

    prompt.push_str(BASE_SYSTEM_PROMPT);
    prompt.push_str(schema);
    prompt.push_str("\n\n");
    prompt.push_str(DATE_KEY_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(AGGREGATION_RULES);
    prompt.push_str("\n\nSQL Query:\n");
    prompt
}
