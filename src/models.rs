//! Core data models for the loan sales assistant

use crate::language::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

//
// ================= Stage =================
//

/// Position of a conversation within the loan journey.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Start,
    AwaitingKyc,
    KycPending,
    SalesDiscovery,
    SalesAmount,
    Underwriting,
    SalarySlipRequired,
    Risk,
    SanctionPrompt,
    Completed,
    Rejected,
    InternalReview,
}

impl Stage {
    pub const ALL: [Stage; 12] = [
        Stage::Start,
        Stage::AwaitingKyc,
        Stage::KycPending,
        Stage::SalesDiscovery,
        Stage::SalesAmount,
        Stage::Underwriting,
        Stage::SalarySlipRequired,
        Stage::Risk,
        Stage::SanctionPrompt,
        Stage::Completed,
        Stage::Rejected,
        Stage::InternalReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::AwaitingKyc => "awaiting_kyc",
            Stage::KycPending => "kyc_pending",
            Stage::SalesDiscovery => "sales_discovery",
            Stage::SalesAmount => "sales_amount",
            Stage::Underwriting => "underwriting",
            Stage::SalarySlipRequired => "salary_slip_required",
            Stage::Risk => "risk",
            Stage::SanctionPrompt => "sanction_prompt",
            Stage::Completed => "completed",
            Stage::Rejected => "rejected",
            Stage::InternalReview => "internal_review",
        }
    }

    /// Journey tracker label shown next to the conversation.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Start => "Conversation Start",
            Stage::AwaitingKyc => "KYC Collection",
            Stage::KycPending => "KYC Verification",
            Stage::SalesDiscovery => "Sales Discovery",
            Stage::SalesAmount => "Loan Requirement",
            Stage::Underwriting => "Underwriting",
            Stage::SalarySlipRequired => "Salary Slip Check",
            Stage::Risk => "Risk Assessment",
            Stage::SanctionPrompt => "Sanction Approval",
            Stage::Completed => "Loan Sanctioned",
            Stage::Rejected => "Application Closed",
            Stage::InternalReview => "Internal Review",
        }
    }

    /// Progress through the journey, in percent.
    pub fn progress(&self) -> u8 {
        match self {
            Stage::Start => 10,
            Stage::AwaitingKyc => 20,
            Stage::KycPending => 30,
            Stage::SalesDiscovery => 45,
            Stage::SalesAmount => 55,
            Stage::Underwriting => 65,
            Stage::SalarySlipRequired => 75,
            Stage::Risk => 85,
            Stage::SanctionPrompt => 95,
            Stage::Completed | Stage::Rejected | Stage::InternalReview => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stage::Completed | Stage::Rejected | Stage::InternalReview
        )
    }

    /// Stages that need no customer input and run as soon as they are entered.
    pub fn is_automatic(&self) -> bool {
        matches!(self, Stage::KycPending | Stage::Underwriting | Stage::Risk)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Risk =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    pub credit_score: i32,
    pub decision: Decision,
    /// Annual rate in percent. Accepts `14.5` as well as `"14.5%"` on input.
    #[serde(default, deserialize_with = "deserialize_rate")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RiskResult {
    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approved
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRate {
    Number(f64),
    Text(String),
}

fn deserialize_rate<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawRate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawRate::Number(rate)) => Ok(Some(rate)),
        Some(RawRate::Text(text)) => crate::underwriting::normalize_rate(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

//
// ================= Eligibility & Fraud =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EligibilityResult {
    Approved {
        eligible_amount: u64,
        available_emi: i64,
    },
    Rejected {
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FraudAssessment {
    pub is_fraud: bool,
    pub reasons: Vec<String>,
    /// Names of the rules that tripped, in engine order.
    #[serde(default)]
    pub rules: Vec<String>,
}

impl FraudAssessment {
    /// Reasons joined the way they are written to the audit log.
    pub fn reason(&self) -> String {
        self.reasons.join("; ")
    }
}

/// One row of the fraud audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudCase {
    pub timestamp: DateTime<Utc>,
    pub name: Option<String>,
    pub city: Option<String>,
    pub credit_score: Option<u64>,
    pub requested_amount: Option<u64>,
    pub preapproved_limit: Option<u64>,
    pub employment_type: Option<String>,
    pub reason: String,
}

impl FraudCase {
    pub fn from_record(record: &SessionRecord, reason: String) -> Self {
        Self {
            timestamp: Utc::now(),
            name: record.name.clone(),
            city: record.city.clone(),
            credit_score: record.credit_score,
            requested_amount: record.requested_amount,
            preapproved_limit: record.preapproved_limit,
            employment_type: record.employment_type.clone(),
            reason,
        }
    }
}

//
// ================= KYC =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KycProfile {
    pub name: String,
    pub city: String,
    pub address: String,
    pub credit_score: u64,
    pub preapproved_limit: u64,
    pub current_loan_emi: u64,
    pub employment_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum KycOutcome {
    Verified(KycProfile),
    Failed { reason: String },
}

//
// ================= Sanction =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SanctionDetails {
    pub loan_id: String,
    pub loan_amount: u64,
    pub interest_rate: f64,
    pub tenure: String,
    pub emi: u64,
    pub file_path: PathBuf,
}

//
// ================= Session Record =================
//

/// Everything the flow has learned about one applicant.
///
/// Created once per conversation and replaced wholesale on reset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionRecord {
    pub stage: Stage,

    pub name: Option<String>,
    pub city: Option<String>,
    pub pan: Option<String>,
    pub phone: Option<String>,

    pub credit_score: Option<u64>,
    pub preapproved_limit: Option<u64>,
    pub current_loan_emi: Option<u64>,
    pub employment_type: Option<String>,

    pub loan_purpose: Option<String>,
    pub requested_amount: Option<u64>,
    pub eligible_amount: Option<u64>,

    risk_result: Option<RiskResult>,
    risk_completed: bool,

    pub sanction_file: Option<PathBuf>,
    pub language: Option<Language>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn apply_kyc(&mut self, profile: &KycProfile) {
        self.city = Some(profile.city.clone());
        self.credit_score = Some(profile.credit_score);
        self.preapproved_limit = Some(profile.preapproved_limit);
        self.employment_type = Some(profile.employment_type.clone());
        self.current_loan_emi = Some(profile.current_loan_emi);
    }

    pub fn risk_result(&self) -> Option<&RiskResult> {
        self.risk_result.as_ref()
    }

    pub fn risk_completed(&self) -> bool {
        self.risk_completed
    }

    /// Store the one and only risk result of this conversation.
    pub fn complete_risk(&mut self, result: RiskResult) {
        self.risk_result = Some(result);
        self.risk_completed = true;
    }

    /// Re-arm the risk stage before (re)entering it.
    pub fn arm_risk(&mut self) {
        self.risk_result = None;
        self.risk_completed = false;
    }
}
