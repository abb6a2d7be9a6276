//! Warehouse data-model description
//!
//! Loads the JSON data-model document (dimension tables, fact tables,
//! business rules and key relationships) once at startup and renders it as
//! the schema section of the SQL generation prompt. A missing or invalid
//! document degrades to a one-line generic description.

use crate::error::{FolioError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

/// Description used when no data-model document is available
pub const GENERIC_SCHEMA_DESCRIPTION: &str = "Database contains standard real estate tables.";

/// A column of a dimension table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub business_meaning: String,
}

/// A measure of a fact table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasureInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionTable {
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub business_purpose: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactTable {
    #[serde(default)]
    pub measures: Vec<MeasureInfo>,
    #[serde(default)]
    pub business_purpose: String,
}

/// Parsed data-model document
///
/// Tables, rule categories and relationships are rendered in name order
/// so the prompt text is stable between runs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaCatalog {
    #[serde(default)]
    pub dimension_tables: BTreeMap<String, DimensionTable>,
    #[serde(default)]
    pub fact_tables: BTreeMap<String, FactTable>,
    #[serde(default)]
    pub business_rules: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub key_relationships: BTreeMap<String, Value>,
}

impl SchemaCatalog {
    /// Parse a data-model document
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a valid document
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FolioError::Serialization(e).into())
    }

    /// Load the document at `path`, falling back to an empty catalog
    ///
    /// Never fails: an unset path, an unreadable file or invalid JSON all
    /// log a warning and yield the generic description.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No data-model document configured");
            return Self::default();
        };

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Could not read data model {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_json_str(&text) {
            Ok(catalog) => {
                tracing::info!(
                    "Loaded data model: {} dimension tables, {} fact tables",
                    catalog.dimension_tables.len(),
                    catalog.fact_tables.len()
                );
                catalog
            }
            Err(e) => {
                tracing::warn!("Could not parse data model {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// True when the document described no tables, rules or relationships
    pub fn is_empty(&self) -> bool {
        self.dimension_tables.is_empty()
            && self.fact_tables.is_empty()
            && self.business_rules.is_empty()
            && self.key_relationships.is_empty()
    }

    /// Names of all described tables, dimensions first
    pub fn table_names(&self) -> Vec<&str> {
        self.dimension_tables
            .keys()
            .chain(self.fact_tables.keys())
            .map(String::as_str)
            .collect()
    }

    /// Render the schema section of the generation prompt
    ///
    /// # Examples
    ///
    /// ```
    /// use folio::schema::SchemaCatalog;
    ///
    /// let catalog = SchemaCatalog::default();
    /// assert_eq!(catalog.describe(), "Database contains standard real estate tables.");
    ///
    /// let catalog = SchemaCatalog::from_json_str(
    ///     r#"{"dimension_tables": {"DimFund": {"columns": [
    ///         {"name": "FundName", "type": "varchar", "business_meaning": "Fund label"}
    ///     ], "business_purpose": "Funds"}}}"#,
    /// ).unwrap();
    /// assert!(catalog.describe().contains("  - FundName (varchar): Fund label"));
    /// ```
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return GENERIC_SCHEMA_DESCRIPTION.to_string();
        }

        let mut out = String::from("COMPLETE DATABASE SCHEMA:\n\n");

        for (name, table) in &self.dimension_tables {
            let _ = writeln!(out, "{}:", name);
            for col in &table.columns {
                let _ = writeln!(
                    out,
                    "  - {} ({}): {}",
                    col.name, col.data_type, col.business_meaning
                );
            }
            let _ = writeln!(out, "  Purpose: {}\n", table.business_purpose);
        }

        for (name, table) in &self.fact_tables {
            let _ = writeln!(out, "{}:", name);
            for measure in &table.measures {
                let _ = writeln!(
                    out,
                    "  - {} ({}): {}",
                    measure.name, measure.data_type, measure.description
                );
            }
            let _ = writeln!(out, "  Purpose: {}\n", table.business_purpose);
        }

        out.push_str("\nBUSINESS RULES:\n");
        for (category, rules) in &self.business_rules {
            let _ = writeln!(out, "{}:", category);
            for (rule, desc) in rules {
                let _ = writeln!(out, "  - {}: {}", rule, plain(desc));
            }
            out.push('\n');
        }

        out.push_str("\nKEY RELATIONSHIPS:\n");
        for (name, desc) in &self.key_relationships {
            match desc {
                Value::Object(entries) => {
                    let _ = writeln!(out, "- {}:", name);
                    for (key, value) in entries {
                        let _ = writeln!(out, "    * {}: {}", key, plain(value));
                    }
                }
                other => {
                    let _ = writeln!(out, "- {}: {}", name, plain(other));
                }
            }
        }

        out
    }
}

/// Strings without their JSON quotes, everything else as JSON text
fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
