//! Error types for the loan sales assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, LoanAssistantError>;

#[derive(Error, Debug)]
pub enum LoanAssistantError {

    // =============================
    // Core Flow Errors
    // =============================

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("KYC lookup error: {0}")]
    KycError(String),

    #[error("Sanction generation error: {0}")]
    SanctionError(String),

    #[error("Audit log error: {0}")]
    AuditError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
