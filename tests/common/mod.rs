use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use folio::config::ChatConfig;
use folio::database::{DatabaseExecutor, QueryResult, SqliteExecutor};
use folio::error::{FolioError, Result};
use folio::providers::{CompletionOptions, CompletionResponse, Message, Provider};
use folio::schema::SchemaCatalog;
use folio::QueryOrchestrator;

/// One provider call as seen by [`ScriptedProvider`]
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Provider that replies from a script and records every call
///
/// Once the script is exhausted every call fails with a provider error.
#[allow(dead_code)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub calls: Arc<Mutex<Vec<ProviderCall>>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse> {
        let find = |role: &str| {
            messages
                .iter()
                .find(|m| m.role == role)
                .map(|m| m.content.clone())
                .unwrap_or_default()
        };
        self.calls.lock().unwrap().push(ProviderCall {
            system: find("system"),
            prompt: find("user"),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        });
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => Ok(CompletionResponse::new(Message::assistant(reply))),
            None => Err(FolioError::Provider("script exhausted".to_string()).into()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Executor that returns a fixed result and records SQL and connection use
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingExecutor {
    pub result: Option<QueryResult>,
    pub log: Arc<Mutex<ExecutorLog>>,
    connected: bool,
}

#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct ExecutorLog {
    pub executed: Vec<String>,
    pub connects: usize,
    pub closes: usize,
}

#[allow(dead_code)]
impl RecordingExecutor {
    pub fn returning(result: Option<QueryResult>) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }
}

impl DatabaseExecutor for RecordingExecutor {
    fn connect(&mut self) -> Result<()> {
        self.connected = true;
        self.log.lock().unwrap().connects += 1;
        Ok(())
    }

    fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        if !self.connected {
            return Err(FolioError::Database("not connected".to_string()).into());
        }
        self.log.lock().unwrap().executed.push(sql.to_string());
        self.result.clone().ok_or_else(|| {
            FolioError::Execution("Query execution failed. Please check the query syntax.".to_string())
                .into()
        })
    }

    fn close(&mut self) {
        if self.connected {
            self.log.lock().unwrap().closes += 1;
        }
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Orchestrator over a scripted provider and a recording executor
#[allow(dead_code)]
pub fn scripted_session(
    replies: &[&str],
    result: Option<QueryResult>,
) -> (
    QueryOrchestrator,
    Arc<Mutex<Vec<ProviderCall>>>,
    Arc<Mutex<ExecutorLog>>,
) {
    let provider = ScriptedProvider::new(replies);
    let calls = Arc::clone(&provider.calls);
    let executor = RecordingExecutor::returning(result);
    let log = Arc::clone(&executor.log);
    let orchestrator = QueryOrchestrator::new(
        Box::new(provider),
        Box::new(executor),
        &SchemaCatalog::default(),
        ChatConfig::default(),
    );
    (orchestrator, calls, log)
}

/// Portfolio warehouse with four assets, two funds and three loans
#[allow(dead_code)]
pub fn seed_warehouse() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let path = tmp.path().join("portfolio.db");
    let conn = rusqlite::Connection::open(&path).expect("failed to create warehouse");
    conn.execute_batch(
        "CREATE TABLE DimAsset (
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
         INSERT INTO FactDebtIssued VALUES (3, 4, 9000000, 0.061, 'Paid Off', 20170520);",
    )
    .expect("failed to seed warehouse");
    (tmp, path)
}

/// Orchestrator over a scripted provider and a seeded SQLite warehouse
#[allow(dead_code)]
pub fn warehouse_session(
    replies: &[&str],
) -> (TempDir, QueryOrchestrator, Arc<Mutex<Vec<ProviderCall>>>) {
    let (tmp, path) = seed_warehouse();
    let provider = ScriptedProvider::new(replies);
    let calls = Arc::clone(&provider.calls);
    let orchestrator = QueryOrchestrator::new(
        Box::new(provider),
        Box::new(SqliteExecutor::new(path, true)),
        &SchemaCatalog::default(),
        ChatConfig::default(),
    );
    (tmp, orchestrator, calls)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
