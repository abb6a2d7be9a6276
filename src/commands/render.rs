//! Terminal rendering of response envelopes

use crate::chat::ResponseEnvelope;
use crate::database::QueryResult;
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use serde_json::Value;

/// Rows printed before the table is cut short
pub const MAX_DISPLAY_ROWS: usize = 100;

/// Plain text for one result cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds a table of at most `max_rows` rows
pub fn result_table(result: &QueryResult, max_rows: usize) -> Table {
    let mut table = Table::new();
    table.set_titles(Row::new(
        result.columns.iter().map(|c| Cell::new(c)).collect(),
    ));
    for row in result.rows.iter().take(max_rows) {
        table.add_row(Row::new(
            row.iter().map(|v| Cell::new(&cell_text(v))).collect(),
        ));
    }
    table
}

/// Prints an envelope the way the REPL and `ask` show it
pub fn print_envelope(envelope: &ResponseEnvelope) {
    if !envelope.success {
        let message = envelope.error.as_deref().unwrap_or("Request failed");
        eprintln!("{}", format!("Error: {}", message).red());
        if let Some(sql) = &envelope.sql_query {
            eprintln!("{}", format!("SQL: {}", sql).dimmed());
        }
        println!();
        return;
    }

    if let Some(sql) = &envelope.sql_query {
        println!("{}", "SQL".cyan().bold());
        println!("{}\n", sql.dimmed());
    }

    if !envelope.data.columns.is_empty() {
        result_table(&envelope.data, MAX_DISPLAY_ROWS).printstd();
        if envelope.row_count > MAX_DISPLAY_ROWS {
            println!(
                "{}",
                format!(
                    "... {} more rows not shown",
                    envelope.row_count - MAX_DISPLAY_ROWS
                )
                .yellow()
            );
        }
        println!("{}\n", format!("{} rows", envelope.row_count).cyan());
    }

    if !envelope.insights.is_empty() {
        println!("{}\n", envelope.insights);
    }
}
