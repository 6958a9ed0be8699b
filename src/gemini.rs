//! Gemini API client for the chat fallback
//!
//! Used when no scripted rule matches the customer's message.
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::LoanAssistantError;
use crate::fallback::ChatFallback;
use crate::memory::{MessageRole, Transcript};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: &str) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: format!("{}/{}:generateContent", BASE_URL, model),
        })
    }

    /// Generate a reply to `message` given the persona and prior turns.
    pub async fn generate(
        &self,
        persona: &str,
        transcript: &Transcript,
        message: &str,
    ) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(LoanAssistantError::LlmError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let request = build_request(persona, transcript, message);
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        info!(
            contents = request.contents.len(),
            history_tokens = transcript.total_tokens(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                LoanAssistantError::LlmError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error response: {}", error_text);
            return Err(LoanAssistantError::LlmError(format!(
                "Gemini API error: {}",
                error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            LoanAssistantError::LlmError(format!("Gemini parse error: {}", e))
        })?;

        extract_answer(gemini_response)
    }
}

#[async_trait]
impl ChatFallback for GeminiClient {
    async fn reply(
        &self,
        persona: &str,
        transcript: &Transcript,
        message: &str,
    ) -> crate::Result<String> {
        self.generate(persona, transcript, message).await
    }
}

fn build_request(persona: &str, transcript: &Transcript, message: &str) -> GeminiRequest {
    let mut contents: Vec<Content> = transcript
        .messages()
        .map(|m| Content {
            role: Some(
                match m.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: m.content.clone(),
            }],
        })
        .collect();

    contents.push(Content {
        role: Some("user".to_string()),
        parts: vec![Part {
            text: message.to_string(),
        }],
    });

    GeminiRequest {
        contents,
        generation_config: GenerationConfig {
            temperature: 0.4,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 512,
        },
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: persona.to_string(),
            }],
        },
    }
}

fn extract_answer(response: GeminiResponse) -> crate::Result<String> {
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        LoanAssistantError::LlmError("No response from Gemini API".to_string())
    })?;

    let answer: String = candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if answer.trim().is_empty() {
        return Err(LoanAssistantError::LlmError(
            "Empty response from Gemini".to_string(),
        ));
    }

    info!(finish_reason = ?candidate.finish_reason, "Gemini response received");

    Ok(answer)
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}
