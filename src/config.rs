//! Runtime configuration
//!
//! Read from the environment (and `.env`, loaded by the binaries).

use crate::error::LoanAssistantError;
use crate::Result;
use std::env;
use std::path::PathBuf;

const DEFAULT_KYC_DB_PATH: &str = "data/kyc_data.csv";
const DEFAULT_FRAUD_LOG_PATH: &str = "data/fraud_cases.csv";
const DEFAULT_FEEDBACK_LOG_PATH: &str = "feedback_data/feedback.csv";
const DEFAULT_SANCTION_DIR: &str = "sanction_letters";
const DEFAULT_LENDER_NAME: &str = "Demo Finance";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub kyc_db_path: PathBuf,
    pub fraud_log_path: PathBuf,
    pub feedback_log_path: PathBuf,
    pub sanction_dir: PathBuf,
    pub lender_name: String,
    /// `None` disables the chat fallback; unmatched messages get a hint instead.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub translation_enabled: bool,
    pub port: u16,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            kyc_db_path: PathBuf::from(DEFAULT_KYC_DB_PATH),
            fraud_log_path: PathBuf::from(DEFAULT_FRAUD_LOG_PATH),
            feedback_log_path: PathBuf::from(DEFAULT_FEEDBACK_LOG_PATH),
            sanction_dir: PathBuf::from(DEFAULT_SANCTION_DIR),
            lender_name: DEFAULT_LENDER_NAME.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            translation_enabled: false,
            port: DEFAULT_PORT,
        }
    }
}

impl AssistantConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                LoanAssistantError::ConfigError(format!("invalid port: {:?}", raw))
            })?,
            None => defaults.port,
        };

        let translation_enabled = match get("TRANSLATION_ENABLED") {
            Some(raw) => parse_flag(&raw)?,
            None => defaults.translation_enabled,
        };

        Ok(Self {
            kyc_db_path: get("KYC_DB_PATH").map(PathBuf::from).unwrap_or(defaults.kyc_db_path),
            fraud_log_path: get("FRAUD_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fraud_log_path),
            feedback_log_path: get("FEEDBACK_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.feedback_log_path),
            sanction_dir: get("SANCTION_DIR").map(PathBuf::from).unwrap_or(defaults.sanction_dir),
            lender_name: get("LENDER_NAME").unwrap_or(defaults.lender_name),
            gemini_api_key: get("GEMINI_API_KEY").filter(|k| k != "your_gemini_api_key_here"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            translation_enabled,
            port,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(LoanAssistantError::ConfigError(format!(
            "invalid boolean: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AssistantConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.kyc_db_path, PathBuf::from("data/kyc_data.csv"));
        assert_eq!(config.port, 8080);
        assert!(config.gemini_api_key.is_none());
        assert!(!config.translation_enabled);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AssistantConfig::from_lookup(lookup(&[
            ("KYC_DB_PATH", "/srv/kyc.csv"),
            ("API_PORT", "9090"),
            ("GEMINI_API_KEY", "secret"),
            ("TRANSLATION_ENABLED", "yes"),
            ("LENDER_NAME", "Acme Credit"),
        ]))
        .unwrap();
        assert_eq!(config.kyc_db_path, PathBuf::from("/srv/kyc.csv"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert!(config.translation_enabled);
        assert_eq!(config.lender_name, "Acme Credit");
    }

    #[test]
    fn test_placeholder_key_is_ignored() {
        let config =
            AssistantConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "your_gemini_api_key_here")]))
                .unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_bad_port_is_a_config_error() {
        let err = AssistantConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, LoanAssistantError::ConfigError(_)));
    }
}
