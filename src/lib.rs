//! Personal Loan Sales Assistant
//!
//! A scripted sales assistant that:
//! - Walks a customer from greeting to a sanctioned loan
//! - Verifies KYC against a customer record set
//! - Underwrites against the pre-approved limit and a risk score
//! - Flags suspicious applications to a fraud audit log
//! - Issues a PDF sanction letter on acceptance
//! - Falls back to an LLM for anything the script does not cover
//!
//! TURN:
//! MESSAGE → RESET? → STAGE HANDLER → TRANSITION → AUTOMATIC STAGES → REPLY

pub mod api;
pub mod audit;
pub mod config;
pub mod conversation;
pub mod error;
pub mod fallback;
pub mod feedback;
pub mod gemini;
pub mod kyc;
pub mod language;
pub mod memory;
pub mod models;
pub mod sanction;
pub mod underwriting;

pub use error::Result;

// Re-export common types
pub use config::AssistantConfig;
pub use conversation::{Conversation, LoanAssistant, TurnReply};
pub use models::*;
