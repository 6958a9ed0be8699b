//! Append-only audit logs
//!
//! Flat comma separated files with a header row written once. Each row
//! is rendered in memory and written with a single `write_all` under the
//! log's lock, then synced. Clones share that lock, so conversations
//! holding the same log never interleave partial rows. Separate logs
//! opened on one path do not coordinate.

use crate::error::LoanAssistantError;
use crate::models::FraudCase;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub const FRAUD_LOG_HEADER: &[&str] = &[
    "timestamp",
    "name",
    "city",
    "credit_score",
    "requested_amount",
    "preapproved_limit",
    "employment_type",
    "reason",
];

/// Header-once CSV file. Clones append under one shared lock.
#[derive(Clone)]
pub struct CsvAppendLog {
    path: PathBuf,
    header: &'static [&'static str],
    lock: Arc<Mutex<()>>,
}

impl CsvAppendLog {
    pub fn new(path: impl Into<PathBuf>, header: &'static [&'static str]) -> Self {
        Self {
            path: path.into(),
            header,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new or empty.
    pub async fn append<T>(&self, row: T) -> Result<()>
    where
        T: Serialize + Send + 'static,
    {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append_blocking(&row))
            .await
            .map_err(|e| LoanAssistantError::AuditError(e.to_string()))?
    }

    fn append_blocking<T: Serialize>(&self, row: &T) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| LoanAssistantError::AuditError("audit log lock poisoned".into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(self.header)?;
        }
        writer.serialize(row)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| LoanAssistantError::AuditError(e.to_string()))?;

        file.write_all(&bytes)?;
        file.sync_data()?;
        Ok(())
    }

    /// Read every row back. A missing file reads as empty; rows that do not
    /// deserialize are skipped.
    pub async fn read_all<T>(&self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.read_all_blocking())
            .await
            .map_err(|e| LoanAssistantError::AuditError(e.to_string()))?
    }

    fn read_all_blocking<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<T>() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) => warn!(path = %self.path.display(), "Skipping unreadable row: {}", e),
            }
        }
        Ok(rows)
    }
}

/// Trait for fraud case sinks
#[async_trait]
pub trait FraudCaseLog: Send + Sync {
    async fn append(&self, case: FraudCase) -> Result<()>;
}

/// Fraud cases written to a CSV file for analyst review
pub struct CsvFraudLog {
    log: CsvAppendLog,
}

impl CsvFraudLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: CsvAppendLog::new(path, FRAUD_LOG_HEADER),
        }
    }

    pub async fn cases(&self) -> Result<Vec<FraudCase>> {
        self.log.read_all().await
    }
}

#[async_trait]
impl FraudCaseLog for CsvFraudLog {
    async fn append(&self, case: FraudCase) -> Result<()> {
        info!(
            path = %self.log.path().display(),
            reason = %case.reason,
            "Recording fraud case"
        );
        self.log.append(case).await
    }
}
