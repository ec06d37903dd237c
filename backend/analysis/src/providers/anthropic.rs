use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use billscope_core::{
    ContentBlock, LlmProvider, LlmRequest, LlmResponse, TokenUsage, DEFAULT_BASE_URL,
};

const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: &request.system_prompt,
            messages: vec![ApiMessage {
                role: "user",
                content: &request.user_prompt,
            }],
        };

        debug!(
            model = %request.model,
            prompt_chars = request.user_prompt.len(),
            "Sending request to Anthropic"
        );

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("Anthropic HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorEnvelope>(&error_body) {
                Ok(envelope) => anyhow::bail!(
                    "Anthropic returned {}: {} ({})",
                    status,
                    envelope.error.message,
                    envelope.error.kind
                ),
                Err(_) => anyhow::bail!("Anthropic returned {}: {}", status, error_body),
            }
        }

        let messages: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            model = %messages.model,
            input_tokens = messages.usage.input_tokens,
            output_tokens = messages.usage.output_tokens,
            latency_ms,
            "Anthropic responded"
        );

        Ok(LlmResponse {
            content: messages.content,
            provider: "anthropic".to_string(),
            model: messages.model,
            stop_reason: messages.stop_reason,
            usage: messages.usage,
            latency_ms,
        })
    }
}
