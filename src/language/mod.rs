//! Multilingual echo
//!
//! Customers may write in an Indian language; the flow itself runs in
//! English. Input is translated in, replies are translated back out.
//! Translation is best effort: a failed call leaves the text untouched.

pub mod google;

pub use google::GoogleTranslator;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Mr,
    Gu,
    Ta,
    Te,
    Bn,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mr => "mr",
            Language::Gu => "gu",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Bn => "bn",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            "mr" => Some(Language::Mr),
            "gu" => Some(Language::Gu),
            "ta" => Some(Language::Ta),
            "te" => Some(Language::Te),
            "bn" => Some(Language::Bn),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Script based detection; the first non-Latin character decides.
pub fn detect_language(text: &str) -> Language {
    for ch in text.chars() {
        match ch {
            '\u{0900}'..='\u{097F}' => return Language::Hi,
            '\u{0980}'..='\u{09FF}' => return Language::Bn,
            '\u{0A80}'..='\u{0AFF}' => return Language::Gu,
            '\u{0B80}'..='\u{0BFF}' => return Language::Ta,
            '\u{0C00}'..='\u{0C7F}' => return Language::Te,
            _ => {}
        }
    }
    Language::En
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String>;
}

/// Translator that never changes anything
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Bring customer text into English for the rules.
pub async fn to_english(translator: &dyn Translator, text: &str, source: Language) -> String {
    if source == Language::En {
        return text.to_string();
    }
    degrade(translator.translate(text, source, Language::En).await, text, source)
}

/// Render an English reply in the customer's language.
pub async fn from_english(translator: &dyn Translator, text: &str, target: Language) -> String {
    if target == Language::En {
        return text.to_string();
    }
    degrade(translator.translate(text, Language::En, target).await, text, target)
}

fn degrade(result: Result<String>, original: &str, language: Language) -> String {
    match result {
        Ok(translated) => translated,
        Err(e) => {
            warn!(%language, "Translation failed, keeping original text: {}", e);
            original.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanAssistantError;

    struct BrokenTranslator;

    #[async_trait]
    impl Translator for BrokenTranslator {
        async fn translate(&self, _: &str, _: Language, _: Language) -> Result<String> {
            Err(LoanAssistantError::TranslationError("offline".into()))
        }
    }

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        async fn translate(&self, text: &str, _: Language, _: Language) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_detects_scripts() {
        assert_eq!(detect_language("my name is Ravi"), Language::En);
        assert_eq!(detect_language("मेरा नाम रवि है"), Language::Hi);
        assert_eq!(detect_language("என் பெயர்"), Language::Ta);
        assert_eq!(detect_language("నా పేరు"), Language::Te);
        assert_eq!(detect_language("મારું નામ"), Language::Gu);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("MR"), Some(Language::Mr));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::Bn.to_string(), "bn");
    }

    #[tokio::test]
    async fn test_english_is_never_sent_to_translator() {
        let text = to_english(&UppercaseTranslator, "hello", Language::En).await;
        assert_eq!(text, "hello");
        let text = from_english(&UppercaseTranslator, "hello", Language::En).await;
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_translation_is_applied_for_other_languages() {
        let text = from_english(&UppercaseTranslator, "hello", Language::Hi).await;
        assert_eq!(text, "HELLO");
    }

    #[tokio::test]
    async fn test_failures_return_original_text() {
        let text = to_english(&BrokenTranslator, "नमस्ते", Language::Hi).await;
        assert_eq!(text, "नमस्ते");
        let text = from_english(&BrokenTranslator, "Hello", Language::Ta).await;
        assert_eq!(text, "Hello");
    }
}
