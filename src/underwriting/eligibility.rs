//! Income based eligibility (40% FOIR rule)

use crate::models::EligibilityResult;

/// Share of monthly income that may go towards EMIs.
const MAX_EMI_SHARE: f64 = 0.4;

const SALARIED_MULTIPLIER: u64 = 15;
const OTHER_MULTIPLIER: u64 = 10;

/// Compute how much an applicant could borrow.
///
/// `available_emi = 0.4 × income − existing_emi`; a non-positive headroom
/// rejects, otherwise income is multiplied by 15 for salaried applicants
/// and by 10 for everyone else.
pub fn check_eligibility(
    income: u64,
    employment_type: &str,
    existing_emi: u64,
) -> EligibilityResult {
    let available_emi = MAX_EMI_SHARE * income as f64 - existing_emi as f64;

    if available_emi <= 0.0 {
        return EligibilityResult::Rejected {
            reason: "High existing EMI burden".to_string(),
        };
    }

    let multiplier = if is_salaried(employment_type) {
        SALARIED_MULTIPLIER
    } else {
        OTHER_MULTIPLIER
    };

    EligibilityResult::Approved {
        eligible_amount: income.saturating_mul(multiplier),
        available_emi: available_emi as i64,
    }
}

pub(crate) fn is_salaried(employment_type: &str) -> bool {
    employment_type.trim().eq_ignore_ascii_case("salaried")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salaried_applicant_gets_fifteen_times_income() {
        let result = check_eligibility(100_000, "salaried", 10_000);
        assert_eq!(
            result,
            EligibilityResult::Approved {
                eligible_amount: 1_500_000,
                available_emi: 30_000,
            }
        );
    }

    #[test]
    fn test_any_other_employment_gets_ten_times_income() {
        for employment in ["self employed", "business", "Freelancer", ""] {
            match check_eligibility(80_000, employment, 0) {
                EligibilityResult::Approved { eligible_amount, .. } => {
                    assert_eq!(eligible_amount, 800_000, "{employment}")
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_employment_type_match_ignores_case() {
        assert!(matches!(
            check_eligibility(10_000, "Salaried", 0),
            EligibilityResult::Approved { eligible_amount: 150_000, .. }
        ));
    }

    #[test]
    fn test_high_existing_emi_rejects() {
        let result = check_eligibility(50_000, "salaried", 40_000);
        assert_eq!(
            result,
            EligibilityResult::Rejected {
                reason: "High existing EMI burden".to_string()
            }
        );
    }

    #[test]
    fn test_zero_headroom_rejects() {
        assert!(matches!(
            check_eligibility(50_000, "salaried", 20_000),
            EligibilityResult::Rejected { .. }
        ));
    }
}
