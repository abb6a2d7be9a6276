use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tabular result of one executed query
///
/// Column order and row order are exactly what the database returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Ordered column names
    pub columns: Vec<String>,
    /// Ordered rows; each row has one scalar per column
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Build a result from columns and rows
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::database::QueryResult;
    /// use serde_json::json;
    ///
    /// let result = QueryResult::new(
    ///     vec!["AssetName".to_string()],
    ///     vec![vec![json!("Harbor Point")]],
    /// );
    /// assert_eq!(result.row_count(), 1);
    /// ```
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the query returned no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` as a column-name keyed object
    pub fn record(&self, index: usize) -> Option<Map<String, Value>> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect(),
        )
    }

    /// The first `n` rows as column-name keyed objects
    pub fn sample_records(&self, n: usize) -> Vec<Map<String, Value>> {
        (0..self.rows.len().min(n))
            .filter_map(|i| self.record(i))
            .collect()
    }

    /// All rows as column-name keyed objects
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.sample_records(self.rows.len())
    }
}
