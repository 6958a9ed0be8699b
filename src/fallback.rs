//! Free-form chat used when no scripted rule applies

use crate::memory::Transcript;
use crate::Result;
use async_trait::async_trait;

/// Trait for chat-completion backends
#[async_trait]
pub trait ChatFallback: Send + Sync {
    /// Answer `message` in the voice of `persona`, given the prior transcript.
    async fn reply(&self, persona: &str, transcript: &Transcript, message: &str) -> Result<String>;
}
