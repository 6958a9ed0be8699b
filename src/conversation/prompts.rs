//! Customer-facing copy

use crate::models::Stage;

pub const SYSTEM_PROMPT: &str = r#"You are a professional yet friendly personal loan sales executive at a large NBFC in India.

Your tone must be:
- Polite
- Helpful
- Conversational
- Not overly formal, not overly casual

Your goals:
1. Understand the customer's loan need
2. Guide them step-by-step
3. Explain simply (no technical jargon unless asked)
4. Hand off tasks to backend agents when needed (verification, eligibility, sanction)

If customer says "start again" or "reset", restart the journey.

Always behave like a human sales executive."#;

pub const RESET: &str =
    "Sure, let's start fresh. How can I help you with a personal loan today?";

pub const KYC_FORMAT: &str = "Format:\nPAN: XXXXX1234X, Phone: XXXXXXXXXX";

pub const KYC_VERIFYING: &str = "Thank you. Verifying your KYC details now...";

pub const KYC_FAILED: &str =
    "KYC verification failed. Please recheck your PAN and phone number.";

pub const AMOUNT_INVALID: &str =
    "Please enter a valid loan amount in numbers (for example: 300000).";

pub const INTERNAL_REVIEW: &str =
    "Your application requires internal review. Our team will get back to you shortly.";

pub const INTERNAL_REVIEW_STATUS: &str = "Your application is under internal review.";

pub const SALARY_SLIP_VERIFIED: &str = "Salary slip verified successfully.";

pub const RISK_PROCESSING: &str = "Processing your application. Please wait...";

pub const CONFIRM_YES_NO: &str = "Please reply with yes or no.";

pub const SANCTION_DECLINED: &str =
    "No problem. You can reach out anytime if you wish to proceed later.";

pub const SANCTION_RETRY: &str =
    "We could not prepare your sanction letter just now. Please reply yes to try again.";

pub const COMPLETED_STATUS: &str = "Thank you for choosing our service.\n\n\
If you need any assistance in the future, feel free to reach out.";

pub fn greet(name: &str) -> String {
    format!(
        "Nice to meet you, {}!\n\n\
         To proceed, I'll need to verify your KYC.\n\
         Please share your PAN and phone number.\n\n{}",
        name, KYC_FORMAT
    )
}

pub fn kyc_format_error() -> String {
    format!("Please provide details in the format:\n{}", KYC_FORMAT.trim_start_matches("Format:\n"))
}

pub fn kyc_verified(name: &str, city: &str, employment_type: &str) -> String {
    format!(
        "KYC verified successfully.\n\n\
         Name: {}, City: {}, Employment Type: {}\n\n\
         To help you better, may I know what you plan to use this loan for?\n\
         (medical, education, travel, or personal needs)",
        name, city, employment_type
    )
}

/// Short pitch matched to what the customer said the loan is for.
pub fn sales_pitch(purpose: &str) -> &'static str {
    let purpose = purpose.to_lowercase();

    if purpose.contains("medical") {
        "I understand medical expenses can be urgent. Our loans are processed quickly."
    } else if purpose.contains("education") {
        "Education is an important investment. A personal loan can help manage these expenses."
    } else if purpose.contains("travel") {
        "Travel planning is exciting. A personal loan can help you manage costs smoothly."
    } else {
        "Personal loans are flexible and suitable for various personal needs."
    }
}

pub fn ask_amount(purpose: &str) -> String {
    format!(
        "{}\n\nPlease tell me the loan amount you are looking for (in INR).",
        sales_pitch(purpose)
    )
}

pub fn amount_noted(amount: u64) -> String {
    format!("Thanks. Let me check what we can offer for ₹{}.", amount)
}

pub fn low_credit_score(score: u64, minimum: u64) -> String {
    format!(
        "Loan rejected due to low credit score.\n\n\
         Credit Score: {}\n\
         Minimum required score is {}.",
        score, minimum
    )
}

pub fn within_limit(requested: u64, limit: u64) -> String {
    format!(
        "Your loan is approved based on the pre-approved offer.\n\n\
         Requested Amount: ₹{}\n\
         Pre-approved Limit: ₹{}\n\n\
         Proceeding with risk assessment.",
        requested, limit
    )
}

pub const SALARY_SLIP_REQUIRED: &str = "Additional verification is required.\n\n\
Please upload your latest salary slip for further review.";

pub fn over_limit(max_allowed: u64) -> String {
    format!(
        "Loan rejected.\n\nRequested amount exceeds the maximum allowed limit of ₹{}.",
        max_allowed
    )
}

pub fn risk_approved(credit_score: i32, risk_level: &str, interest_rate: f64) -> String {
    format!(
        "Credit assessment completed.\n\n\
         Credit Score: {}\n\
         Risk Level: {}\n\
         Interest Rate: {}%\n\n\
         Would you like to proceed with final loan sanction? (yes / no)",
        credit_score, risk_level, interest_rate
    )
}

pub fn risk_rejected(reason: &str) -> String {
    format!("Loan rejected after risk assessment.\n\nReason: {}", reason)
}

pub fn sanctioned(loan_amount: u64, interest_rate: f64, tenure: &str, emi: u64) -> String {
    format!(
        "Your loan has been sanctioned successfully.\n\n\
         Loan Amount: ₹{}\n\
         Interest Rate: {}%\n\
         Tenure: {}\n\
         Monthly EMI: ₹{}\n\n\
         You may download your sanction letter below. Our team will contact you \
         shortly for disbursement and further documentation.",
        loan_amount, interest_rate, tenure, emi
    )
}

/// What to say when no rule matched and the chat model is unavailable.
pub fn stage_hint(stage: Stage) -> String {
    match stage {
        Stage::Start => "I can help you with a personal loan. To begin, please tell me your \
                         name (for example: \"My name is Ravi\")."
            .to_string(),
        Stage::AwaitingKyc => format!(
            "To continue, please share your PAN and phone number.\n\n{}",
            KYC_FORMAT
        ),
        Stage::Rejected => "Your application could not be approved this time. \
                            Type \"start again\" to begin a new application."
            .to_string(),
        _ => "I didn't quite catch that. Type \"reset\" to start over.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_matches_purpose() {
        assert!(sales_pitch("Medical emergency").contains("medical"));
        assert!(sales_pitch("my daughter's EDUCATION").contains("Education"));
        assert!(sales_pitch("travel to Goa").contains("Travel"));
        assert!(sales_pitch("wedding").contains("flexible"));
    }

    #[test]
    fn test_kyc_format_error_shows_expected_format() {
        assert!(kyc_format_error().ends_with("PAN: XXXXX1234X, Phone: XXXXXXXXXX"));
    }
}
