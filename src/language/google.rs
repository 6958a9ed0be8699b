//! Google Translate client
//!
//! Uses the public `translate_a/single` endpoint the web widget talks to.
//! The response is a nested JSON array; the first element holds one
//! `[translated, original, ...]` entry per sentence.

use super::{Language, Translator};
use crate::error::LoanAssistantError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String> {
        debug!(%source, %target, chars = text.len(), "Translating text");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LoanAssistantError::TranslationError(format!(
                "translate endpoint returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
    }
}

fn parse_translation(body: &Value) -> Result<String> {
    let sentences = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| LoanAssistantError::TranslationError("unexpected response shape".into()))?;

    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(LoanAssistantError::TranslationError("empty translation".into()));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_joins_sentences() {
        let body = json!([
            [["Hello. ", "नमस्ते। ", null, null], ["My name is Ravi", "मेरा नाम रवि है", null, null]],
            null,
            "hi"
        ]);
        assert_eq!(parse_translation(&body).unwrap(), "Hello. My name is Ravi");
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        assert!(parse_translation(&json!({"error": "quota"})).is_err());
        assert!(parse_translation(&json!([[]])).is_err());
    }
}
