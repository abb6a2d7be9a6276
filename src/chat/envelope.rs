//! Response envelope returned for every chat turn

use crate::chat::intent::Intent;
use crate::database::QueryResult;
use crate::error::{ErrorKind, FolioError};
use serde::Serialize;

/// Shown in place of SQL when a turn ran no query
pub const NO_QUERY_DISPLAY: &str = "No database query needed";

/// Outcome of one chat turn
///
/// `error` and `error_kind` are set exactly when `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub question: String,
    pub sql_query: Option<String>,
    pub data: QueryResult,
    pub insights: String,
    pub row_count: usize,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ResponseEnvelope {
    /// Successful turn that ran no query
    pub fn answered(question: impl Into<String>, intent: Intent, insights: impl Into<String>) -> Self {
        Self {
            success: true,
            question: question.into(),
            sql_query: None,
            data: QueryResult::default(),
            insights: insights.into(),
            row_count: 0,
            intent,
            error: None,
            error_kind: None,
        }
    }

    /// Successful turn that executed `sql`
    pub fn with_query(
        question: impl Into<String>,
        intent: Intent,
        sql: impl Into<String>,
        data: QueryResult,
        insights: impl Into<String>,
    ) -> Self {
        let row_count = data.row_count();
        Self {
            success: true,
            question: question.into(),
            sql_query: Some(sql.into()),
            data,
            insights: insights.into(),
            row_count,
            intent,
            error: None,
            error_kind: None,
        }
    }

    /// Failed turn
    pub fn failure(
        question: impl Into<String>,
        intent: Intent,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            question: question.into(),
            sql_query: None,
            data: QueryResult::default(),
            insights: String::new(),
            row_count: 0,
            intent,
            error: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    /// Failed turn built from a propagated error
    ///
    /// Errors that are not a [`FolioError`] are reported as general failures.
    pub fn from_error(question: impl Into<String>, intent: Intent, error: &anyhow::Error) -> Self {
        let kind = error
            .downcast_ref::<FolioError>()
            .map(FolioError::kind)
            .unwrap_or(ErrorKind::GeneralFailure);
        Self::failure(question, intent, kind, error.to_string())
    }

    /// Attaches the SQL that was attempted to a failed envelope
    pub fn attempted(mut self, sql: impl Into<String>) -> Self {
        self.sql_query = Some(sql.into());
        self
    }

    /// SQL text for display
    pub fn sql_display(&self) -> &str {
        self.sql_query.as_deref().unwrap_or(NO_QUERY_DISPLAY)
    }
}
