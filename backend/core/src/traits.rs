use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BillError;
use crate::types::DocumentText;

/// Trait for LLM providers used by the analysis pipeline.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "anthropic", "mock").
    fn name(&self) -> &str;

    /// Send a completion request and return the raw provider response.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Pulls plain text out of a document stored on disk.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<DocumentText, BillError>;
}

/// Anthropic model used for bill analysis unless configured otherwise.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Output token budget per analysis unless configured otherwise.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Anthropic API root.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Request to an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
}

/// One block of a provider response. Only text blocks carry `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub provider: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

impl LlmResponse {
    /// Text of the first content block, if that block carries text.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|b| b.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content: Vec<ContentBlock>) -> LlmResponse {
        LlmResponse {
            content,
            provider: "mock".into(),
            model: "mock".into(),
            stop_reason: None,
            usage: TokenUsage::default(),
            latency_ms: 0,
        }
    }

    #[test]
    fn first_text_reads_only_the_first_block() {
        let r = response(vec![ContentBlock::text("one"), ContentBlock::text("two")]);
        assert_eq!(r.first_text(), Some("one"));

        let r = response(vec![]);
        assert_eq!(r.first_text(), None);

        let r = response(vec![ContentBlock {
            kind: "tool_use".into(),
            text: None,
        }]);
        assert_eq!(r.first_text(), None);
    }
}
