//! Narrative insights over query results

use crate::database::QueryResult;
use crate::prompts::analyst_prompt::{insights_prompt, INSIGHTS_SYSTEM_INSTRUCTION};
use crate::providers::Provider;
use tracing::warn;

const INSIGHT_TEMPERATURE: f32 = 0.3;
const INSIGHT_MAX_TOKENS: u32 = 500;

/// Summarizes query results into business insight text
#[derive(Debug, Clone, Copy)]
pub struct InsightSummarizer {
    sample_rows: usize,
}

impl InsightSummarizer {
    pub fn new(sample_rows: usize) -> Self {
        Self { sample_rows }
    }

    /// Compact description of a result for the insight prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::chat::insights::InsightSummarizer;
    /// use folio::database::QueryResult;
    /// use serde_json::json;
    ///
    /// let result = QueryResult::new(
    ///     vec!["FundName".into(), "TotalEquity".into()],
    ///     vec![vec![json!("Fund I"), json!(1200000)]],
    /// );
    /// let digest = InsightSummarizer::new(2).digest(&result);
    /// assert!(digest.starts_with("Query returned 1 results with columns: FundName, TotalEquity."));
    /// assert!(digest.contains("\"FundName\":\"Fund I\""));
    /// ```
    pub fn digest(&self, result: &QueryResult) -> String {
        let sample = serde_json::to_string(&result.sample_records(self.sample_rows))
            .unwrap_or_else(|_| "[]".to_string());
        format!(
            "Query returned {} results with columns: {}. Sample data includes: {}",
            result.row_count(),
            result.columns.join(", "),
            sample
        )
    }

    /// Deterministic text used whenever narration is unavailable
    pub fn fallback(result: &QueryResult) -> String {
        format!(
            "Query executed successfully and returned {} results with columns: {}",
            result.row_count(),
            result.columns.join(", ")
        )
    }

    /// Asks the provider for insights; never fails
    pub async fn summarize(&self, provider: &dyn Provider, question: &str, result: &QueryResult) -> String {
        let prompt = insights_prompt(question, &self.digest(result));
        match provider
            .complete_prompt(
                INSIGHTS_SYSTEM_INSTRUCTION,
                &prompt,
                INSIGHT_TEMPERATURE,
                INSIGHT_MAX_TOKENS,
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Insight generation failed, using fallback: {}", e);
                Self::fallback(result)
            }
        }
    }
}
