//! Transition table for the loan journey
//!
//! Stage handlers only decide which [`Event`] happened; where that event
//! leads is decided here, in one place.

use crate::models::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Reset,
    NameDeclared,
    KycDetailsCaptured,
    KycDetailsMalformed,
    KycVerified,
    KycFailed,
    PurposeGiven,
    AmountCaptured,
    AmountMalformed,
    CreditScoreTooLow,
    FraudFlagged,
    WithinLimit,
    SalarySlipNeeded,
    OverLimit,
    SalarySlipReceived,
    RiskAlreadyAssessed,
    RiskApproved,
    RiskRejected,
    SanctionAccepted,
    SanctionDeclined,
    SanctionUnclear,
    SanctionFailed,
    StatusRequested,
    /// No scripted rule applied; answered by the chat fallback.
    Unmatched,
}

/// Where `event` leads from `stage`, or `None` if it cannot happen there.
pub fn next_stage(stage: Stage, event: Event) -> Option<Stage> {
    use Event::*;
    use Stage::*;

    let next = match (stage, event) {
        (_, Reset) => Start,

        (Start, NameDeclared) => AwaitingKyc,

        (AwaitingKyc, KycDetailsCaptured) => KycPending,
        (AwaitingKyc, KycDetailsMalformed) => AwaitingKyc,

        (KycPending, KycVerified) => SalesDiscovery,
        (KycPending, KycFailed) => AwaitingKyc,

        (SalesDiscovery, PurposeGiven) => SalesAmount,

        (SalesAmount, AmountCaptured) => Underwriting,
        (SalesAmount, AmountMalformed) => SalesAmount,

        (Underwriting, CreditScoreTooLow) => Rejected,
        (Underwriting, FraudFlagged) => InternalReview,
        (Underwriting, WithinLimit) => Risk,
        (Underwriting, SalarySlipNeeded) => SalarySlipRequired,
        (Underwriting, OverLimit) => Rejected,

        (SalarySlipRequired, SalarySlipReceived) => Risk,

        (Risk, RiskAlreadyAssessed) => Risk,
        (Risk, RiskApproved) => SanctionPrompt,
        (Risk, RiskRejected) => Rejected,

        (SanctionPrompt, SanctionAccepted) => Completed,
        (SanctionPrompt, SanctionDeclined) => Completed,
        (SanctionPrompt, SanctionUnclear) => SanctionPrompt,
        (SanctionPrompt, SanctionFailed) => SanctionPrompt,

        (Completed, StatusRequested) => Completed,
        (InternalReview, StatusRequested) => InternalReview,

        (Start | AwaitingKyc | Rejected, Unmatched) => stage,

        _ => return None,
    };

    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_connected() {
        let path = [
            (Event::NameDeclared, Stage::AwaitingKyc),
            (Event::KycDetailsCaptured, Stage::KycPending),
            (Event::KycVerified, Stage::SalesDiscovery),
            (Event::PurposeGiven, Stage::SalesAmount),
            (Event::AmountCaptured, Stage::Underwriting),
            (Event::WithinLimit, Stage::Risk),
            (Event::RiskApproved, Stage::SanctionPrompt),
            (Event::SanctionAccepted, Stage::Completed),
        ];

        let mut stage = Stage::Start;
        for (event, expected) in path {
            stage = next_stage(stage, event).unwrap();
            assert_eq!(stage, expected);
        }
    }

    #[test]
    fn test_reset_is_legal_everywhere() {
        for stage in Stage::ALL {
            assert_eq!(next_stage(stage, Event::Reset), Some(Stage::Start));
        }
    }

    #[test]
    fn test_terminal_stages_never_leave_except_by_reset() {
        let events = [
            Event::NameDeclared,
            Event::KycVerified,
            Event::AmountCaptured,
            Event::WithinLimit,
            Event::RiskApproved,
            Event::SanctionAccepted,
            Event::StatusRequested,
            Event::Unmatched,
        ];

        for stage in Stage::ALL.into_iter().filter(|s| s.is_terminal()) {
            for event in events {
                if let Some(next) = next_stage(stage, event) {
                    assert_eq!(next, stage, "{stage} left via {event:?}");
                }
            }
        }
    }

    #[test]
    fn test_automatic_stages_never_fall_back_to_chat() {
        for stage in Stage::ALL.into_iter().filter(|s| s.is_automatic()) {
            assert_eq!(next_stage(stage, Event::Unmatched), None);
        }
    }

    #[test]
    fn test_illegal_jumps_are_rejected() {
        assert_eq!(next_stage(Stage::Start, Event::SanctionAccepted), None);
        assert_eq!(next_stage(Stage::SalesAmount, Event::RiskApproved), None);
        assert_eq!(next_stage(Stage::Risk, Event::Unmatched), None);
    }
}
