//! Anthropic-compatible Messages API client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{AiConfig, AI_KEY_ENV};

use super::error::AskError;
use super::AiQueryService;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AskClient {
    client: Client,
    config: AiConfig,
    api_key: String,
}

impl AskClient {
    /// Fails with [`AskError::NotConfigured`] when no API key is available.
    pub fn new(config: AiConfig) -> Result<Self, AskError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AskError::NotConfigured(format!("set ai.api_key or {}", AI_KEY_ENV))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds as u64))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn build_request(&self, prompt: &str) -> ApiRequest {
        ApiRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }
}

#[async_trait]
impl AiQueryService for AskClient {
    async fn ask(&self, prompt: &str) -> Result<String, AskError> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = self.build_request(prompt);

        tracing::debug!(url = %url, model = %self.config.model, "Sending AI request");

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AskError::Timeout(self.config.timeout_seconds as u64)
                } else {
                    AskError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::error!(status = %status, error = %message, "AI API error");
            return Err(AskError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| AskError::Parse(format!("Failed to parse response JSON: {}", e)))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            "AI request completed"
        );
        extract_text(parsed)
    }
}

/// Joins all text blocks; non-text blocks are skipped.
fn extract_text(response: ApiResponse) -> Result<String, AskError> {
    let text = response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        Err(AskError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}
