//! Bureau-style risk scoring
//!
//! Starts from a fixed base score and applies penalties for EMI burden
//! and employment type, then bands the result into a pricing decision.

use super::eligibility::is_salaried;
use crate::error::LoanAssistantError;
use crate::models::{Decision, RiskLevel, RiskResult};
use crate::Result;

const BASE_SCORE: i32 = 750;

const SEVERE_EMI_RATIO: f64 = 0.5;
const SEVERE_EMI_PENALTY: i32 = 150;
const ELEVATED_EMI_RATIO: f64 = 0.35;
const ELEVATED_EMI_PENALTY: i32 = 80;
const NON_SALARIED_PENALTY: i32 = 50;

const LOW_RISK_FLOOR: i32 = 720;
const MEDIUM_RISK_FLOOR: i32 = 650;

const LOW_RISK_RATE: f64 = 10.5;
const MEDIUM_RISK_RATE: f64 = 14.5;

pub const REJECTION_REASON: &str = "Low creditworthiness based on risk assessment";

/// Score an application.
///
/// `income` must be positive; a zero income is rejected as invalid input
/// rather than producing a meaningless ratio.
pub fn assess_risk(income: u64, employment_type: &str, existing_emi: u64) -> Result<RiskResult> {
    if income == 0 {
        return Err(LoanAssistantError::InvalidInput(
            "risk scoring requires a positive income".to_string(),
        ));
    }

    let emi_ratio = existing_emi as f64 / income as f64;
    let mut score = BASE_SCORE;

    if emi_ratio > SEVERE_EMI_RATIO {
        score -= SEVERE_EMI_PENALTY;
    } else if emi_ratio > ELEVATED_EMI_RATIO {
        score -= ELEVATED_EMI_PENALTY;
    }

    if !is_salaried(employment_type) {
        score -= NON_SALARIED_PENALTY;
    }

    Ok(band_score(score))
}

/// Map a final score onto a risk band and pricing decision.
pub fn band_score(credit_score: i32) -> RiskResult {
    if credit_score >= LOW_RISK_FLOOR {
        RiskResult {
            risk_level: RiskLevel::Low,
            credit_score,
            decision: Decision::Approved,
            interest_rate: Some(LOW_RISK_RATE),
            reason: None,
        }
    } else if credit_score >= MEDIUM_RISK_FLOOR {
        RiskResult {
            risk_level: RiskLevel::Medium,
            credit_score,
            decision: Decision::Approved,
            interest_rate: Some(MEDIUM_RISK_RATE),
            reason: None,
        }
    } else {
        RiskResult {
            risk_level: RiskLevel::High,
            credit_score,
            decision: Decision::Rejected,
            interest_rate: None,
            reason: Some(REJECTION_REASON.to_string()),
        }
    }
}

/// Parse a rate such as `"14.5%"`, `" 10.5 % "` or `"12"` into a number.
pub fn normalize_rate(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    number.parse::<f64>().map_err(|_| {
        LoanAssistantError::InvalidInput(format!("not an interest rate: {:?}", text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_salaried_profile_is_low_risk() {
        let result = assess_risk(500_000, "salaried", 0).unwrap();
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.credit_score, 750);
        assert_eq!(result.decision, Decision::Approved);
        assert_eq!(result.interest_rate, Some(10.5));
    }

    #[test]
    fn test_elevated_emi_ratio_moves_to_medium() {
        // 0.4 ratio: 750 - 80 = 670
        let result = assess_risk(100_000, "salaried", 40_000).unwrap();
        assert_eq!(result.credit_score, 670);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.interest_rate, Some(14.5));
    }

    #[test]
    fn test_non_salaried_penalty_applies_to_any_other_type() {
        let result = assess_risk(100_000, "business", 0).unwrap();
        assert_eq!(result.credit_score, 700);
        assert_eq!(result.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_severe_burden_and_self_employment_rejects() {
        let result = assess_risk(100_000, "self employed", 60_000).unwrap();
        assert_eq!(result.credit_score, 550);
        assert_eq!(result.decision, Decision::Rejected);
        assert_eq!(result.interest_rate, None);
        assert_eq!(result.reason.as_deref(), Some(REJECTION_REASON));
    }

    #[test]
    fn test_score_680_is_medium_and_approved() {
        let result = band_score(680);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.decision, Decision::Approved);
        assert_eq!(result.interest_rate, Some(14.5));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(band_score(720).risk_level, RiskLevel::Low);
        assert_eq!(band_score(719).risk_level, RiskLevel::Medium);
        assert_eq!(band_score(650).risk_level, RiskLevel::Medium);
        assert_eq!(band_score(649).risk_level, RiskLevel::High);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let first = assess_risk(250_000, "salaried", 90_000).unwrap();
        let second = assess_risk(250_000, "salaried", 90_000).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_income_is_invalid_input() {
        let err = assess_risk(0, "salaried", 1_000).unwrap_err();
        assert!(matches!(err, LoanAssistantError::InvalidInput(_)));
    }

    #[test]
    fn test_normalize_rate() {
        assert_eq!(normalize_rate("10.5%").unwrap(), 10.5);
        assert_eq!(normalize_rate(" 14.5 % ").unwrap(), 14.5);
        assert_eq!(normalize_rate("12").unwrap(), 12.0);
        assert!(normalize_rate("ten").is_err());
    }
}
