//! Canned SQL for common questions
//!
//! An ordered table of trigger/action pairs evaluated against the lowercase
//! question. The first trigger that fires decides the outcome: either SQL is
//! rendered directly, or the template declines and the question is handed to
//! the generative step.

use regex::Regex;
use std::sync::LazyLock;

/// What a matching template does
#[derive(Clone, Copy)]
pub enum TemplateAction {
    /// Produce SQL from the question text
    Render(fn(&str) -> String),
    /// Refuse the question so it is delegated instead
    Decline,
}

/// One entry of the template table
pub struct SqlTemplate {
    /// Stable name used in logs and tests
    pub name: &'static str,
    trigger: fn(&str) -> bool,
    action: TemplateAction,
}

impl SqlTemplate {
    /// Whether the template fires for `lower`
    pub fn matches(&self, lower: &str) -> bool {
        (self.trigger)(lower)
    }

    pub fn action(&self) -> TemplateAction {
        self.action
    }
}

impl std::fmt::Debug for SqlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlTemplate").field("name", &self.name).finish()
    }
}

/// Outcome of matching the template table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateMatch {
    /// A template rendered SQL
    Sql { name: &'static str, sql: String },
    /// A template fired but declined
    Declined { name: &'static str },
}

/// Property-type words; two distinct ones in a question make it compound
const PROPERTY_TYPES: &[&str] = &[
    "commercial",
    "hospitality",
    "multifamily",
    "retail",
    "office",
    "industrial",
];

const DEFAULT_TOP_LIMIT: u32 = 5;

static FIRST_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer pattern"));

fn has(text: &str, needle: &str) -> bool {
    text.contains(needle)
}

fn is_compound(lower: &str) -> bool {
    PROPERTY_TYPES.iter().filter(|t| lower.contains(*t)).count() >= 2
}

/// The first integer in the question, or 5
pub fn top_limit(question: &str) -> u32 {
    FIRST_INTEGER
        .find(question)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(DEFAULT_TOP_LIMIT)
}

fn top_performing_sql(question: &str) -> String {
    format!(
        "SELECT TOP {} a.AssetName, a.PropertyType, a.City, a.State,
       SUM(ao.NetOperatingIncome) AS TotalNOI,
       SUM(ao.TotalRevenue) AS TotalRevenue,
       AVG(ao.PhysicalOccupancy) AS AvgOccupancy
FROM FactAssetOperations ao
JOIN DimAsset a ON ao.AssetID = a.AssetID
GROUP BY a.AssetName, a.PropertyType, a.City, a.State
ORDER BY TotalNOI DESC",
        top_limit(question)
    )
}

fn fund_equity_sql(_: &str) -> String {
    "SELECT f.FundName, SUM(fi.InvestmentAmount) AS TotalEquity
FROM FactInvestment fi
JOIN DimFund f ON fi.FundID = f.FundID
GROUP BY f.FundName
ORDER BY TotalEquity DESC"
        .to_string()
}

fn all_properties_sql(_: &str) -> String {
    "SELECT AssetName, PropertyType, City, State, AssetStatus
FROM DimAsset
ORDER BY AssetName"
        .to_string()
}

fn cities_sql(_: &str) -> String {
    "SELECT DISTINCT City, State, COUNT(*) AS PropertyCount
FROM DimAsset
WHERE City IS NOT NULL
GROUP BY City, State
ORDER BY PropertyCount DESC"
        .to_string()
}

fn total_debt_sql(_: &str) -> String {
    "SELECT SUM(CurrentBalance) AS TotalDebt,
       COUNT(*) AS NumberOfLoans,
       AVG(InterestRate) AS AvgInterestRate
FROM FactDebtIssued
WHERE DebtStatus = 'Current'"
        .to_string()
}

fn multifamily_sql(_: &str) -> String {
    "SELECT AssetID, AssetName, PropertyType, City, State, NumberOfUnits, TotalSquareFootage, AssetStatus
FROM DimAsset
WHERE PropertyType = 'Multifamily'
ORDER BY AssetName"
        .to_string()
}

fn hospitality_sql(_: &str) -> String {
    "SELECT AssetID, AssetName, PropertyType, PropertySubType, City, State, NumberOfUnits, AssetStatus
FROM DimAsset
WHERE PropertyType = 'Hospitality'
ORDER BY AssetName"
        .to_string()
}

fn property_types_sql(_: &str) -> String {
    "SELECT DISTINCT PropertyType, COUNT(*) AS Count
FROM DimAsset
GROUP BY PropertyType
ORDER BY Count DESC"
        .to_string()
}

fn high_noi_sql(_: &str) -> String {
    "SELECT TOP 10 a.AssetName, a.PropertyType, ao.NetOperatingIncome AS NOI, ao.ReportingDateKey
FROM FactAssetOperations ao
JOIN DimAsset a ON ao.AssetID = a.AssetID
WHERE ao.NetOperatingIncome IS NOT NULL
ORDER BY ao.NetOperatingIncome DESC"
        .to_string()
}

fn acquisition_price_sql(_: &str) -> String {
    "SELECT AssetName, PropertyType, City, State, AcquisitionPrice, AcquisitionDate
FROM DimAsset
WHERE AcquisitionPrice IS NOT NULL
ORDER BY AcquisitionPrice DESC"
        .to_string()
}

static TEMPLATES: &[SqlTemplate] = &[
    SqlTemplate {
        name: "compound_property_types",
        trigger: is_compound,
        action: TemplateAction::Decline,
    },
    SqlTemplate {
        name: "top_performing",
        trigger: |q| has(q, "top") && has(q, "performing"),
        action: TemplateAction::Render(top_performing_sql),
    },
    SqlTemplate {
        name: "fund_equity",
        trigger: |q| has(q, "equity") && has(q, "fund"),
        action: TemplateAction::Render(fund_equity_sql),
    },
    SqlTemplate {
        name: "all_properties",
        trigger: |q| has(q, "all properties") || has(q, "show properties"),
        action: TemplateAction::Render(all_properties_sql),
    },
    SqlTemplate {
        name: "cities",
        trigger: |q| has(q, "cities"),
        action: TemplateAction::Render(cities_sql),
    },
    SqlTemplate {
        name: "total_debt",
        trigger: |q| has(q, "total debt") || has(q, "outstanding debt"),
        action: TemplateAction::Render(total_debt_sql),
    },
    SqlTemplate {
        name: "multifamily",
        trigger: |q| has(q, "multifamily"),
        action: TemplateAction::Render(multifamily_sql),
    },
    SqlTemplate {
        name: "hospitality",
        trigger: |q| has(q, "hospitality"),
        action: TemplateAction::Render(hospitality_sql),
    },
    SqlTemplate {
        name: "property_types",
        trigger: |q| has(q, "property types"),
        action: TemplateAction::Render(property_types_sql),
    },
    SqlTemplate {
        name: "high_noi",
        trigger: |q| {
            (has(q, "noi") || has(q, "net operating income")) && (has(q, "high") || has(q, "top"))
        },
        action: TemplateAction::Render(high_noi_sql),
    },
    SqlTemplate {
        name: "acquisition_price",
        trigger: |q| has(q, "acquisition") && has(q, "price"),
        action: TemplateAction::Render(acquisition_price_sql),
    },
];

/// The template table in priority order
pub fn templates() -> &'static [SqlTemplate] {
    TEMPLATES
}

/// Runs the template table against a question
///
/// # Examples
///
/// ```
/// use folio::chat::templates::{match_template, TemplateMatch};
///
/// match match_template("top 3 performing assets") {
///     Some(TemplateMatch::Sql { name, sql }) => {
///         assert_eq!(name, "top_performing");
///         assert!(sql.starts_with("SELECT TOP 3 "));
///     }
///     other => panic!("unexpected {:?}", other),
/// }
///
/// assert_eq!(
///     match_template("list commercial and hospitality assets"),
///     Some(TemplateMatch::Declined { name: "compound_property_types" })
/// );
/// assert_eq!(match_template("average rent per unit"), None);
/// ```
pub fn match_template(question: &str) -> Option<TemplateMatch> {
    let lower = question.to_lowercase();
    let template = TEMPLATES.iter().find(|t| t.matches(&lower))?;
    Some(match template.action {
        TemplateAction::Render(render) => TemplateMatch::Sql {
            name: template.name,
            sql: render(question),
        },
        TemplateAction::Decline => TemplateMatch::Declined {
            name: template.name,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched_name(question: &str) -> Option<&'static str> {
        match match_template(question)? {
            TemplateMatch::Sql { name, .. } | TemplateMatch::Declined { name } => Some(name),
        }
    }

    fn sql_for(question: &str) -> String {
        match match_template(question) {
            Some(TemplateMatch::Sql { sql, .. }) => sql,
            other => panic!("expected SQL for {:?}, got {:?}", question, other),
        }
    }

    #[test]
    fn test_top_performing_limit() {
        assert!(sql_for("top 3 performing assets").starts_with("SELECT TOP 3 "));
        assert!(sql_for("Top performing properties").starts_with("SELECT TOP 5 "));
        assert!(sql_for("top 12 performing, then 4 more").starts_with("SELECT TOP 12 "));
    }

    #[test]
    fn test_top_limit_overflow_uses_default() {
        assert_eq!(top_limit("top 99999999999999999999 performing"), 5);
        assert_eq!(top_limit("top performing"), 5);
    }

    #[test]
    fn test_each_template_reachable() {
        assert_eq!(matched_name("total equity for each fund"), Some("fund_equity"));
        assert_eq!(matched_name("show me all properties"), Some("all_properties"));
        assert_eq!(matched_name("what cities are we in"), Some("cities"));
        assert_eq!(matched_name("what is our total debt"), Some("total_debt"));
        assert_eq!(matched_name("list multifamily"), Some("multifamily"));
        assert_eq!(matched_name("hospitality assets"), Some("hospitality"));
        assert_eq!(matched_name("what property types do we have"), Some("property_types"));
        assert_eq!(matched_name("properties with high NOI"), Some("high_noi"));
        assert_eq!(matched_name("sort by acquisition price"), Some("acquisition_price"));
    }

    #[test]
    fn test_priority_order() {
        // "top" + "performing" wins over the NOI template
        assert_eq!(matched_name("top performing noi"), Some("top_performing"));
        // fund equity wins over cities
        assert_eq!(matched_name("fund equity across cities"), Some("fund_equity"));
    }

    #[test]
    fn test_compound_guard_is_first() {
        assert_eq!(
            matched_name("multifamily and hospitality properties"),
            Some("compound_property_types")
        );
        assert_eq!(
            matched_name("top performing retail and office"),
            Some("compound_property_types")
        );
        assert_eq!(matched_name("list multifamily properties"), Some("multifamily"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_template("average occupancy by quarter"), None);
    }

    #[test]
    fn test_templates_are_single_statements() {
        for question in [
            "top performing",
            "fund equity",
            "all properties",
            "cities",
            "total debt",
            "multifamily",
            "hospitality",
            "property types",
            "high noi",
            "acquisition price",
        ] {
            let sql = sql_for(question);
            assert!(sql.starts_with("SELECT"), "{}", question);
            assert!(!sql.contains(';'), "{}", question);
        }
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut names: Vec<&str> = templates().iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), templates().len());
    }
}
