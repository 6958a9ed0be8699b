//! Underwriting engines
//!
//! Pure, deterministic scoring used by the conversation flow.
//! Nothing in here performs I/O.

pub mod eligibility;
pub mod fraud;
pub mod risk;

pub use eligibility::check_eligibility;
pub use fraud::{create_default_fraud_engine, FraudEngine, FraudInputs, FraudRule};
pub use risk::{assess_risk, band_score, normalize_rate};

/// Minimum bureau score accepted at the underwriting gate.
pub const MIN_CREDIT_SCORE: u64 = 700;

/// Requests up to this multiple of the preapproved limit may be
/// considered after a salary slip check.
pub const SALARY_SLIP_LIMIT_MULTIPLIER: u64 = 2;
