//! Loan journey state machine
//!
//! One customer message in, one reply out. Each conversation owns its
//! [`SessionRecord`]; the assistant itself is stateless and can serve any
//! number of conversations.
//!
//! TURN:
//! RESET? → TRANSLATE IN → STAGE HANDLER → TRANSITION → (AUTOMATIC STAGE?) → TRANSLATE OUT

pub mod parse;
pub mod prompts;
pub mod transitions;

use crate::audit::{CsvFraudLog, FraudCaseLog};
use crate::config::AssistantConfig;
use crate::error::LoanAssistantError;
use crate::fallback::ChatFallback;
use crate::gemini::GeminiClient;
use crate::kyc::{CsvKycStore, KycLookup};
use crate::language::{self, GoogleTranslator, Language, PassthroughTranslator, Translator};
use crate::memory::{MessageRole, Transcript};
use crate::models::{FraudCase, KycOutcome, SanctionDetails, SessionRecord, Stage};
use crate::sanction::{PdfSanctionGenerator, SanctionGenerator};
use crate::underwriting::{
    assess_risk, create_default_fraud_engine, FraudEngine, FraudInputs, MIN_CREDIT_SCORE,
    SALARY_SLIP_LIMIT_MULTIPLIER,
};
use crate::Result;
use parse::Confirmation;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use transitions::{next_stage, Event};
use uuid::Uuid;

/// One conversation: its record plus what has been said so far.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: Uuid,
    record: SessionRecord,
    transcript: Transcript,
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            record: SessionRecord::new(),
            transcript: Transcript::new(),
        }
    }

    /// Resume from an existing record, e.g. one prepared by a test harness.
    pub fn from_record(record: SessionRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record,
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Pin the reply language instead of detecting it from the next message.
    pub fn set_language(&mut self, language: Language) {
        self.record.language = Some(language);
    }

    pub fn stage(&self) -> Stage {
        self.record.stage
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Start a new application: wipes the record and the transcript.
    pub fn restart(&mut self) {
        self.record.reset();
        self.transcript.clear();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub reply: String,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanction: Option<SanctionDetails>,
}

/// What a stage handler decided.
struct Outcome {
    event: Event,
    reply: String,
    sanction: Option<SanctionDetails>,
}

impl Outcome {
    fn new(event: Event, reply: impl Into<String>) -> Self {
        Self {
            event,
            reply: reply.into(),
            sanction: None,
        }
    }
}

/// The scripted loan assistant
pub struct LoanAssistant {
    kyc: Arc<dyn KycLookup>,
    sanction: Arc<dyn SanctionGenerator>,
    fraud_log: Arc<dyn FraudCaseLog>,
    fraud_engine: FraudEngine,
    fallback: Option<Arc<dyn ChatFallback>>,
    translator: Arc<dyn Translator>,
}

impl LoanAssistant {
    pub fn new(
        kyc: Arc<dyn KycLookup>,
        sanction: Arc<dyn SanctionGenerator>,
        fraud_log: Arc<dyn FraudCaseLog>,
    ) -> Self {
        Self {
            kyc,
            sanction,
            fraud_log,
            fraud_engine: create_default_fraud_engine(),
            fallback: None,
            translator: Arc::new(PassthroughTranslator),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ChatFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Wire the file-backed collaborators named in the configuration.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let mut assistant = Self::new(
            Arc::new(CsvKycStore::new(&config.kyc_db_path)),
            Arc::new(PdfSanctionGenerator::new(
                &config.sanction_dir,
                config.lender_name.clone(),
            )),
            Arc::new(CsvFraudLog::new(&config.fraud_log_path)),
        );

        match &config.gemini_api_key {
            Some(key) => {
                assistant = assistant
                    .with_fallback(Arc::new(GeminiClient::new(key.clone(), &config.gemini_model)?));
            }
            None => warn!("GEMINI_API_KEY not set; unmatched messages get scripted hints"),
        }

        if config.translation_enabled {
            assistant = assistant.with_translator(Arc::new(GoogleTranslator::new()?));
        }

        Ok(assistant)
    }

    /// Handle one customer message.
    pub async fn respond(&self, conversation: &mut Conversation, message: &str) -> Result<TurnReply> {
        let language = *conversation
            .record
            .language
            .get_or_insert_with(|| language::detect_language(message));

        let english = language::to_english(self.translator.as_ref(), message, language).await;

        let (reply, sanction) = self.step(conversation, &english).await?;

        let reply = language::from_english(self.translator.as_ref(), &reply, language).await;

        conversation.transcript.push(MessageRole::User, message);
        conversation.transcript.push(MessageRole::Assistant, reply.clone());

        let stage = conversation.record.stage;
        Ok(TurnReply {
            reply,
            stage,
            stage_label: stage.label(),
            progress: stage.progress(),
            sanction,
        })
    }

    async fn step(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> Result<(String, Option<SanctionDetails>)> {
        let Conversation {
            id,
            record,
            transcript,
        } = conversation;

        if parse::is_reset(message) {
            info!(conversation_id = %id, from = %record.stage, "Conversation reset");
            record.reset();
            return Ok((prompts::RESET.to_string(), None));
        }

        let mut replies = Vec::new();
        let mut sanction = None;

        loop {
            let from = record.stage;
            let outcome = self.handle_stage(record, transcript, message).await?;

            let to = next_stage(from, outcome.event).ok_or_else(|| {
                error!(stage = %from, event = ?outcome.event, "Illegal transition");
                LoanAssistantError::InvalidInput(format!(
                    "event {:?} is not valid in stage {}",
                    outcome.event, from
                ))
            })?;

            if to != from {
                info!(conversation_id = %id, %from, %to, event = ?outcome.event, "Stage transition");
            }

            record.stage = to;
            replies.push(outcome.reply);
            if outcome.sanction.is_some() {
                sanction = outcome.sanction;
            }

            if to == from || !to.is_automatic() {
                break;
            }
        }

        Ok((replies.join("\n\n"), sanction))
    }

    async fn handle_stage(
        &self,
        record: &mut SessionRecord,
        transcript: &Transcript,
        message: &str,
    ) -> Result<Outcome> {
        let outcome = match record.stage {
            Stage::Start => self.on_start(record, message),
            Stage::AwaitingKyc => self.on_awaiting_kyc(record, message),
            Stage::KycPending => self.on_kyc_pending(record).await?,
            Stage::SalesDiscovery => self.on_sales_discovery(record, message),
            Stage::SalesAmount => self.on_sales_amount(record, message),
            Stage::Underwriting => self.on_underwriting(record).await?,
            Stage::SalarySlipRequired => self.on_salary_slip(record)?,
            Stage::Risk => self.on_risk(record)?,
            Stage::SanctionPrompt => self.on_sanction_prompt(record, message).await?,
            Stage::Completed => Some(Outcome::new(Event::StatusRequested, prompts::COMPLETED_STATUS)),
            Stage::InternalReview => {
                Some(Outcome::new(Event::StatusRequested, prompts::INTERNAL_REVIEW_STATUS))
            }
            Stage::Rejected => None,
        };

        match outcome {
            Some(outcome) => Ok(outcome),
            None => {
                let reply = self.fallback_reply(record.stage, transcript, message).await;
                Ok(Outcome::new(Event::Unmatched, reply))
            }
        }
    }

    fn on_start(&self, record: &mut SessionRecord, message: &str) -> Option<Outcome> {
        if record.name.is_some() {
            return None;
        }

        let name = parse::extract_name(message)?;
        let reply = prompts::greet(&name);
        record.name = Some(name);
        Some(Outcome::new(Event::NameDeclared, reply))
    }

    fn on_awaiting_kyc(&self, record: &mut SessionRecord, message: &str) -> Option<Outcome> {
        if !parse::mentions_kyc(message) {
            return None;
        }

        let outcome = match parse::parse_kyc_details(message) {
            Ok(credentials) => {
                record.pan = Some(credentials.pan);
                record.phone = Some(credentials.phone);
                Outcome::new(Event::KycDetailsCaptured, prompts::KYC_VERIFYING)
            }
            Err(e) => {
                debug!("KYC details rejected: {}", e);
                Outcome::new(Event::KycDetailsMalformed, prompts::kyc_format_error())
            }
        };
        Some(outcome)
    }

    async fn on_kyc_pending(&self, record: &mut SessionRecord) -> Result<Option<Outcome>> {
        let (Some(name), Some(pan), Some(phone)) = (&record.name, &record.pan, &record.phone)
        else {
            return Ok(Some(Outcome::new(Event::KycFailed, prompts::KYC_FAILED)));
        };

        let lookup = self.kyc.lookup(name, pan, phone).await;
        let outcome = match lookup {
            Ok(KycOutcome::Verified(profile)) => {
                record.apply_kyc(&profile);
                Outcome::new(
                    Event::KycVerified,
                    prompts::kyc_verified(&profile.name, &profile.city, &profile.employment_type),
                )
            }
            Ok(KycOutcome::Failed { reason }) => {
                info!(%reason, "KYC verification failed");
                Outcome::new(Event::KycFailed, prompts::KYC_FAILED)
            }
            Err(e) => {
                warn!("KYC lookup unavailable, treating as failed: {}", e);
                Outcome::new(Event::KycFailed, prompts::KYC_FAILED)
            }
        };

        Ok(Some(outcome))
    }

    fn on_sales_discovery(&self, record: &mut SessionRecord, message: &str) -> Option<Outcome> {
        let purpose = message.trim().to_string();
        let reply = prompts::ask_amount(&purpose);
        record.loan_purpose = Some(purpose);
        Some(Outcome::new(Event::PurposeGiven, reply))
    }

    fn on_sales_amount(&self, record: &mut SessionRecord, message: &str) -> Option<Outcome> {
        let outcome = match parse::parse_amount(message) {
            Ok(amount) => {
                record.requested_amount = Some(amount);
                Outcome::new(Event::AmountCaptured, prompts::amount_noted(amount))
            }
            Err(e) => {
                debug!("Loan amount rejected: {}", e);
                Outcome::new(Event::AmountMalformed, prompts::AMOUNT_INVALID)
            }
        };
        Some(outcome)
    }

    async fn on_underwriting(&self, record: &mut SessionRecord) -> Result<Option<Outcome>> {
        let (Some(credit_score), Some(limit), Some(requested)) = (
            record.credit_score,
            record.preapproved_limit,
            record.requested_amount,
        ) else {
            return Err(LoanAssistantError::InvalidInput(
                "underwriting requires a verified profile and a requested amount".to_string(),
            ));
        };

        if credit_score < MIN_CREDIT_SCORE {
            return Ok(Some(Outcome::new(
                Event::CreditScoreTooLow,
                prompts::low_credit_score(credit_score, MIN_CREDIT_SCORE),
            )));
        }

        let ceiling = limit.saturating_mul(SALARY_SLIP_LIMIT_MULTIPLIER);
        if requested > ceiling {
            return Ok(Some(Outcome::new(Event::OverLimit, prompts::over_limit(ceiling))));
        }

        let within_limit = requested <= limit;
        if within_limit {
            record.eligible_amount = Some(requested);
        }

        let assessment = self.fraud_engine.assess(&FraudInputs::from_record(record));
        if assessment.is_fraud {
            let case = FraudCase::from_record(record, assessment.reason());
            if let Err(e) = self.fraud_log.append(case).await {
                error!("Failed to record fraud case: {}", e);
            }
            return Ok(Some(Outcome::new(Event::FraudFlagged, prompts::INTERNAL_REVIEW)));
        }

        if within_limit {
            record.arm_risk();
            return Ok(Some(Outcome::new(
                Event::WithinLimit,
                prompts::within_limit(requested, limit),
            )));
        }

        Ok(Some(Outcome::new(
            Event::SalarySlipNeeded,
            prompts::SALARY_SLIP_REQUIRED,
        )))
    }

    fn on_salary_slip(&self, record: &mut SessionRecord) -> Result<Option<Outcome>> {
        let requested = record.requested_amount.ok_or_else(|| {
            LoanAssistantError::InvalidInput("salary slip check without a requested amount".into())
        })?;

        record.eligible_amount = Some(requested);
        record.arm_risk();
        Ok(Some(Outcome::new(
            Event::SalarySlipReceived,
            prompts::SALARY_SLIP_VERIFIED,
        )))
    }

    fn on_risk(&self, record: &mut SessionRecord) -> Result<Option<Outcome>> {
        if record.risk_completed() {
            return Ok(Some(Outcome::new(
                Event::RiskAlreadyAssessed,
                prompts::RISK_PROCESSING,
            )));
        }

        let eligible = record.eligible_amount.ok_or_else(|| {
            LoanAssistantError::InvalidInput("risk stage entered without an eligible amount".into())
        })?;
        let employment_type = record.employment_type.as_deref().unwrap_or_default();
        let existing_emi = record.current_loan_emi.unwrap_or(0);

        let result = assess_risk(eligible, employment_type, existing_emi)?;
        info!(
            risk_level = ?result.risk_level,
            credit_score = result.credit_score,
            decision = ?result.decision,
            "Risk assessed"
        );

        let outcome = match (result.is_approved(), result.interest_rate) {
            (true, Some(rate)) => Outcome::new(
                Event::RiskApproved,
                prompts::risk_approved(result.credit_score, &result.risk_level.to_string(), rate),
            ),
            _ => Outcome::new(
                Event::RiskRejected,
                prompts::risk_rejected(result.reason.as_deref().unwrap_or("Not approved")),
            ),
        };

        record.complete_risk(result);
        Ok(Some(outcome))
    }

    async fn on_sanction_prompt(
        &self,
        record: &mut SessionRecord,
        message: &str,
    ) -> Result<Option<Outcome>> {
        let outcome = match parse::parse_confirmation(message) {
            Some(Confirmation::Yes) => self.sanction(record).await?,
            Some(Confirmation::No) => Outcome::new(Event::SanctionDeclined, prompts::SANCTION_DECLINED),
            None => Outcome::new(Event::SanctionUnclear, prompts::CONFIRM_YES_NO),
        };
        Ok(Some(outcome))
    }

    async fn sanction(&self, record: &mut SessionRecord) -> Result<Outcome> {
        let name = record.name.clone().unwrap_or_default();
        let amount = record.eligible_amount.ok_or_else(|| {
            LoanAssistantError::InvalidInput("sanction requested without an eligible amount".into())
        })?;
        let rate = record
            .risk_result()
            .and_then(|r| r.interest_rate)
            .ok_or_else(|| {
                LoanAssistantError::InvalidInput("sanction requested without a priced risk result".into())
            })?;

        match self.sanction.generate(&name, amount, rate).await {
            Ok(details) => {
                record.sanction_file = Some(details.file_path.clone());
                let reply =
                    prompts::sanctioned(details.loan_amount, details.interest_rate, &details.tenure, details.emi);
                Ok(Outcome {
                    event: Event::SanctionAccepted,
                    reply,
                    sanction: Some(details),
                })
            }
            Err(e) => {
                error!("Sanction generation failed: {}", e);
                Ok(Outcome::new(Event::SanctionFailed, prompts::SANCTION_RETRY))
            }
        }
    }

    async fn fallback_reply(&self, stage: Stage, transcript: &Transcript, message: &str) -> String {
        let Some(fallback) = &self.fallback else {
            return prompts::stage_hint(stage);
        };

        match fallback.reply(prompts::SYSTEM_PROMPT, transcript, message).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(%stage, "Chat fallback failed, replying with hint: {}", e);
                prompts::stage_hint(stage)
            }
        }
    }
}
