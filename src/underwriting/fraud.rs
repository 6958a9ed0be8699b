//! Rule-based fraud screening
//!
//! Every rule is evaluated; the application is flagged when any of them
//! trips. Reasons are reported in rule order.

use crate::models::{FraudAssessment, SessionRecord};
use tracing::info;

/// Numbers the fraud rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FraudInputs {
    pub credit_score: u64,
    pub requested_amount: u64,
    pub preapproved_limit: u64,
    pub current_loan_emi: u64,
}

impl FraudInputs {
    /// Missing values read as a clean profile with a limit of one unit.
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            credit_score: record.credit_score.unwrap_or(0),
            requested_amount: record.requested_amount.unwrap_or(0),
            preapproved_limit: record.preapproved_limit.unwrap_or(1),
            current_loan_emi: record.current_loan_emi.unwrap_or(0),
        }
    }
}

/// Trait for fraud rules
pub trait FraudRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Human readable reason when the rule trips, `None` otherwise.
    fn check(&self, inputs: &FraudInputs) -> Option<String>;
}

/// Fraud engine that evaluates every rule
pub struct FraudEngine {
    rules: Vec<Box<dyn FraudRule>>,
}

impl FraudEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn FraudRule>) {
        self.rules.push(rule);
    }

    pub fn assess(&self, inputs: &FraudInputs) -> FraudAssessment {
        let mut tripped = Vec::new();
        let mut reasons = Vec::new();
        for rule in &self.rules {
            if let Some(reason) = rule.check(inputs) {
                tripped.push(rule.name().to_string());
                reasons.push(reason);
            }
        }

        let is_fraud = !reasons.is_empty();

        info!(
            rule_count = self.rules.len(),
            rules = ?tripped,
            is_fraud,
            "Fraud screening completed"
        );

        FraudAssessment {
            is_fraud,
            reasons,
            rules: tripped,
        }
    }
}

impl Default for FraudEngine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ========== Rules ==========
//

/// Rule: very low bureau score
pub struct LowCreditScoreRule;

impl FraudRule for LowCreditScoreRule {
    fn name(&self) -> &'static str {
        "low_credit_score"
    }

    fn check(&self, inputs: &FraudInputs) -> Option<String> {
        (inputs.credit_score < 650).then(|| "Low credit score".to_string())
    }
}

/// Rule: request far above the preapproved limit
pub struct OversizedRequestRule;

impl FraudRule for OversizedRequestRule {
    fn name(&self) -> &'static str {
        "oversized_request"
    }

    fn check(&self, inputs: &FraudInputs) -> Option<String> {
        (inputs.requested_amount > inputs.preapproved_limit.saturating_mul(3))
            .then(|| "Requested amount unusually high".to_string())
    }
}

/// Rule: existing EMI eats most of the limit
pub struct EmiBurdenRule;

impl FraudRule for EmiBurdenRule {
    fn name(&self) -> &'static str {
        "emi_burden"
    }

    fn check(&self, inputs: &FraudInputs) -> Option<String> {
        (inputs.current_loan_emi as f64 > 0.6 * inputs.preapproved_limit as f64)
            .then(|| "High existing EMI burden".to_string())
    }
}

/// Create a fraud engine with the standard rules
pub fn create_default_fraud_engine() -> FraudEngine {
    let mut engine = FraudEngine::new();
    engine.add_rule(Box::new(LowCreditScoreRule));
    engine.add_rule(Box::new(OversizedRequestRule));
    engine.add_rule(Box::new(EmiBurdenRule));
    engine
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean() -> FraudInputs {
        FraudInputs {
            credit_score: 780,
            requested_amount: 200_000,
            preapproved_limit: 300_000,
            current_loan_emi: 5_000,
        }
    }

    #[test]
    fn test_clean_application_is_not_flagged() {
        let result = create_default_fraud_engine().assess(&clean());
        assert!(!result.is_fraud);
        assert!(result.reasons.is_empty());
        assert_eq!(result.reason(), "");
    }

    #[test]
    fn test_each_rule_triggers_on_its_own() {
        let engine = create_default_fraud_engine();

        let low_score = FraudInputs { credit_score: 649, ..clean() };
        let result = engine.assess(&low_score);
        assert_eq!(result.reasons, vec!["Low credit score"]);
        assert_eq!(result.rules, vec!["low_credit_score"]);

        let oversized = FraudInputs { requested_amount: 900_001, ..clean() };
        assert_eq!(
            engine.assess(&oversized).reasons,
            vec!["Requested amount unusually high"]
        );

        let burden = FraudInputs { current_loan_emi: 180_001, ..clean() };
        assert_eq!(engine.assess(&burden).reasons, vec!["High existing EMI burden"]);
    }

    #[test]
    fn test_boundaries_do_not_trigger() {
        let edge = FraudInputs {
            credit_score: 650,
            requested_amount: 900_000,
            preapproved_limit: 300_000,
            current_loan_emi: 180_000,
        };
        assert!(!create_default_fraud_engine().assess(&edge).is_fraud);
    }

    #[test]
    fn test_reason_count_matches_triggered_rules() {
        let all = FraudInputs {
            credit_score: 500,
            requested_amount: 1_000_000,
            preapproved_limit: 100_000,
            current_loan_emi: 70_000,
        };
        let result = create_default_fraud_engine().assess(&all);
        assert!(result.is_fraud);
        assert_eq!(result.reasons.len(), 3);
        assert_eq!(
            result.rules,
            vec!["low_credit_score", "oversized_request", "emi_burden"]
        );
        assert_eq!(
            result.reason(),
            "Low credit score; Requested amount unusually high; High existing EMI burden"
        );
    }

    #[test]
    fn test_missing_record_fields_use_neutral_defaults() {
        let record = SessionRecord::new();
        let inputs = FraudInputs::from_record(&record);
        assert_eq!(inputs.preapproved_limit, 1);
        assert_eq!(inputs.credit_score, 0);
    }
}
