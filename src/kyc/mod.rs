//! KYC verification against the customer record set
//!
//! Customers are matched on PAN (case-insensitive) and phone number
//! (exact). The name they gave is informational only.

use crate::models::{KycOutcome, KycProfile};
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const NOT_FOUND_REASON: &str = "PAN or phone number not found in KYC records";

/// Trait for KYC backends
#[async_trait]
pub trait KycLookup: Send + Sync {
    async fn lookup(&self, name: &str, pan: &str, phone: &str) -> Result<KycOutcome>;
}

/// One row of the KYC file.
#[derive(Debug, Clone, Deserialize)]
struct KycRow {
    name: String,
    pan: String,
    phone: String,
    city: String,
    address: String,
    credit_score: u64,
    preapproved_limit: u64,
    current_loan_emi: u64,
    employment_type: String,
}

impl KycRow {
    fn matches(&self, pan: &str, phone: &str) -> bool {
        self.pan.trim().to_uppercase() == pan && self.phone.trim() == phone
    }

    fn into_profile(self) -> KycProfile {
        KycProfile {
            name: self.name,
            city: self.city,
            address: self.address,
            credit_score: self.credit_score,
            preapproved_limit: self.preapproved_limit,
            current_loan_emi: self.current_loan_emi,
            employment_type: self.employment_type,
        }
    }
}

/// KYC store backed by a comma separated file with a header row.
///
/// The file is read on every lookup so edits are picked up without a
/// restart.
pub struct CsvKycStore {
    path: PathBuf,
}

impl CsvKycStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn find_customer(path: &Path, pan: &str, phone: &str) -> Result<Option<KycProfile>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    for row in reader.deserialize::<KycRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(path = %path.display(), "Skipping unreadable KYC row: {}", e);
                continue;
            }
        };
        if row.matches(pan, phone) {
            return Ok(Some(row.into_profile()));
        }
    }

    Ok(None)
}

#[async_trait]
impl KycLookup for CsvKycStore {
    async fn lookup(&self, name: &str, pan: &str, phone: &str) -> Result<KycOutcome> {
        let pan = pan.trim().to_uppercase();
        let phone = phone.trim().to_string();
        let path = self.path.clone();

        debug!(claimed_name = %name, "Looking up KYC record");

        let found = tokio::task::spawn_blocking(move || find_customer(&path, &pan, &phone))
            .await
            .map_err(|e| crate::error::LoanAssistantError::KycError(e.to_string()))??;

        match found {
            Some(profile) => {
                info!(city = %profile.city, "KYC verified");
                Ok(KycOutcome::Verified(profile))
            }
            None => {
                info!("KYC record not found");
                Ok(KycOutcome::Failed {
                    reason: NOT_FOUND_REASON.to_string(),
                })
            }
        }
    }
}
