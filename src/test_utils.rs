//! Test utilities for Folio
//!
//! Temporary directories, test files, a seeded SQLite warehouse and
//! assertion helpers shared by unit tests.

use crate::config::Config;
use crate::error::FolioError;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Portfolio warehouse used by tests: four assets, two funds, three loans
/// and one operations row per asset
const WAREHOUSE_SQL: &str = "
CREATE TABLE DimAsset (
    AssetID INTEGER PRIMARY KEY, AssetName TEXT, PropertyType TEXT, PropertySubType TEXT,
    City TEXT, State TEXT, AssetStatus TEXT, NumberOfUnits INTEGER,
    TotalSquareFootage INTEGER, AcquisitionPrice REAL, AcquisitionDate TEXT
);
INSERT INTO DimAsset VALUES (1, 'Harbor Point', 'Multifamily', 'Garden', 'Austin', 'TX', 'Active', 240, 210000, 41000000, '2019-03-01');
INSERT INTO DimAsset VALUES (2, 'Elm Court', 'Multifamily', 'Mid-rise', 'Denver', 'CO', 'Active', 120, 98000, 23500000, '2020-07-15');
INSERT INTO DimAsset VALUES (3, 'Bayview Suites', 'Hospitality', 'Select Service', 'Miami', 'FL', 'Active', 180, 120000, 38000000, '2018-11-30');
INSERT INTO DimAsset VALUES (4, 'Market Square', 'Retail', 'Strip Center', 'Austin', 'TX', 'Held for Sale', NULL, 65000, 15500000, '2017-05-20');

CREATE TABLE FactAssetOperations (
    AssetID INTEGER, ReportingDateKey INTEGER, NetOperatingIncome REAL,
    TotalRevenue REAL, PhysicalOccupancy REAL
);
INSERT INTO FactAssetOperations VALUES (1, 20240331, 2100000, 3900000, 0.95);
INSERT INTO FactAssetOperations VALUES (2, 20240331, 1150000, 2050000, 0.91);
INSERT INTO FactAssetOperations VALUES (3, 20240331, 2600000, 6100000, 0.78);
INSERT INTO FactAssetOperations VALUES (4, 20240331, 640000, 1200000, 0.88);

CREATE TABLE DimFund (FundID INTEGER PRIMARY KEY, FundName TEXT);
INSERT INTO DimFund VALUES (1, 'Value-Add Fund I');
INSERT INTO DimFund VALUES (2, 'Core Plus Fund II');

CREATE TABLE FactInvestment (FundID INTEGER, InvestmentAmount REAL);
INSERT INTO FactInvestment VALUES (1, 25000000);
INSERT INTO FactInvestment VALUES (1, 10000000);
INSERT INTO FactInvestment VALUES (2, 30000000);

CREATE TABLE FactDebtIssued (
    LoanID INTEGER, AssetID INTEGER, CurrentBalance REAL, InterestRate REAL,
    DebtStatus TEXT, IssuanceDateKey INTEGER
);
INSERT INTO FactDebtIssued VALUES (1, 1, 24000000, 0.045, 'Current', 20190301);
INSERT INTO FactDebtIssued VALUES (2, 3, 21000000, 0.052, 'Current', 20181130);
INSERT INTO FactDebtIssued VALUES (3, 4, 9000000, 0.061, 'Paid Off', 20170520);
";

/// Create a seeded SQLite warehouse inside `dir`
///
/// # Panics
///
/// Panics if the database cannot be created
pub fn seed_warehouse(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("portfolio.db");
    let conn = rusqlite::Connection::open(&path).expect("Failed to create warehouse");
    conn.execute_batch(WAREHOUSE_SQL)
        .expect("Failed to seed warehouse");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T, FolioError>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
provider:
  type: ollama
  openai:
    model: gpt-4o-mini
    timeout_seconds: 30
  ollama:
    host: http://localhost:11434
    model: llama3.2:latest

database:
  path: data/test.db
  read_only: true

chat:
  repeat_window: 3
  max_transcript_turns: 20
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_seed_warehouse() {
        let dir = temp_dir();
        let path = seed_warehouse(&dir);
        let conn = rusqlite::Connection::open(path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM DimAsset", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<(), FolioError> =
            Err(FolioError::Config("test error message".to_string()));
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<(), FolioError> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<(), FolioError> =
            Err(FolioError::Config("different error".to_string()));
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert_eq!(config.provider.provider_type, "openai");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.provider.provider_type, "ollama");
        assert_eq!(config.chat.repeat_window, 3);
        assert_eq!(config.chat.context_turns, 4);
        assert!(config.validate().is_ok());
    }
}
