//! LLM-provider port: an opaque text-generation capability, used by the
//! Reflection Engine (C12) to summarize clusters into reflections.

use crate::error::Result;
use async_trait::async_trait;

/// A single turn in a multi-turn prompt, for `generate_with_context`.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The speaker of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// Opaque text-generation capability. Concrete backends (hosted API,
/// local inference, ...) are out of scope for the core.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Single-shot generation.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: u32,
        temperature: f32,
        stop_sequences: &[String],
    ) -> Result<String>;

    /// Multi-turn generation over a message history.
    async fn generate_with_context(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Token count for `text`, used to budget prompts.
    fn count_tokens(&self, text: &str) -> u32;

    /// Summarize `text` to at most `max_length` tokens.
    async fn summarize(&self, text: &str, max_length: u32) -> Result<String>;

    /// Extract named entities / salient terms from `text`.
    async fn extract_entities(&self, text: &str) -> Result<Vec<String>>;
}
