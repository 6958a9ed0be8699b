//! Sanction letter generation
//!
//! Prices the loan over a fixed tenure and renders a one-page PDF letter
//! per sanctioned loan.

pub mod letter;

pub use letter::PdfSanctionGenerator;

use crate::models::SanctionDetails;
use crate::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub const TENURE_MONTHS: u64 = 36;

/// Trait for sanction document backends
#[async_trait]
pub trait SanctionGenerator: Send + Sync {
    async fn generate(
        &self,
        customer_name: &str,
        loan_amount: u64,
        interest_rate: f64,
    ) -> Result<SanctionDetails>;
}

/// Flat-rate monthly instalment: `floor(amount × (1 + rate/100) / 36)`.
///
/// The rate is taken to two decimals so the result is exact integer math.
pub fn compute_emi(loan_amount: u64, interest_rate: f64) -> u64 {
    let rate_bps = (interest_rate * 100.0).round().max(0.0) as u128;
    let total = loan_amount as u128 * (10_000 + rate_bps);
    (total / (TENURE_MONTHS as u128 * 10_000)) as u64
}

pub fn tenure_label() -> String {
    format!("{} months", TENURE_MONTHS)
}

pub fn new_loan_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("PL-{}", id[..8].to_uppercase())
}

/// Group digits in threes: `1500000` → `1,500,000`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emi_for_half_million_at_ten_and_a_half() {
        assert_eq!(compute_emi(500_000, 10.5), 15_347);
    }

    #[test]
    fn test_emi_at_medium_rate() {
        // 300000 * 1.145 / 36 = 9541.66
        assert_eq!(compute_emi(300_000, 14.5), 9_541);
    }

    #[test]
    fn test_emi_is_exact_on_whole_results() {
        assert_eq!(compute_emi(360_000, 0.0), 10_000);
        assert_eq!(compute_emi(3_600, 10.5), 110);
    }

    #[test]
    fn test_loan_id_shape() {
        let id = new_loan_id();
        assert!(id.starts_with("PL-"));
        assert_eq!(id.len(), 11);
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1_000), "1,000");
        assert_eq!(format_amount(1_500_000), "1,500,000");
    }
}
