//! Anthropic Messages API completion client (non-streaming).
//!
//! One request per tutor turn: role-tagged messages in, a single text
//! result or a [`ProviderError`] out. No retries; a failure is surfaced
//! once per attempt and the caller decides what to tell the user.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::providers::shared::{
    ChatMessage, ProviderError, ProviderResult, resolve_api_key, resolve_base_url,
};

/// Default base URL for the Anthropic API.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const API_VERSION: &str = "2023-06-01";

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl CompletionConfig {
    /// Builds the client configuration from the loaded config file.
    ///
    /// Authentication resolution order:
    /// 1. `api_key` in `[providers.anthropic]`
    /// 2. `ANTHROPIC_API_KEY` environment variable
    ///
    /// Base URL resolution order:
    /// 1. `ANTHROPIC_BASE_URL` environment variable
    /// 2. `base_url` in `[providers.anthropic]`
    /// 3. Default: `https://api.anthropic.com`
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = resolve_api_key(
            config.providers.anthropic.api_key.as_deref(),
            "ANTHROPIC_API_KEY",
            "anthropic",
        )?;
        let base_url = resolve_base_url(
            config.providers.anthropic.base_url.as_deref(),
            "ANTHROPIC_BASE_URL",
            DEFAULT_BASE_URL,
            "Anthropic",
        )?;

        Ok(Self {
            api_key,
            base_url,
            model: config.tutor.model.clone(),
            max_tokens: config.tutor.max_tokens,
            temperature: config.tutor.temperature,
            request_timeout: config.tutor.request_timeout(),
        })
    }
}

/// Completion API client.
pub struct CompletionClient {
    config: CompletionConfig,
    http: reqwest::Client,
}

impl CompletionClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Panics
    /// - In test builds, panics if `base_url` is the production API.
    /// - At runtime, panics if `AULA_BLOCK_REAL_API=1` and `base_url` is
    ///   the production API.
    ///
    /// This prevents tests from accidentally making real network requests.
    /// Point `ANTHROPIC_BASE_URL` at a mock server instead.
    pub fn new(config: CompletionConfig) -> Self {
        #[cfg(test)]
        if config.base_url == DEFAULT_BASE_URL {
            panic!(
                "Tests must not use the production Anthropic API!\n\
                 Set ANTHROPIC_BASE_URL to a mock server (e.g., wiremock).\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        #[cfg(not(test))]
        if std::env::var("AULA_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == DEFAULT_BASE_URL
        {
            panic!(
                "AULA_BLOCK_REAL_API=1 but trying to use production Anthropic API!\n\
                 Set ANTHROPIC_BASE_URL to a mock server.\n\
                 Found base_url: {}",
                config.base_url
            );
        }

        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Sends one completion request and returns the reply text.
    pub async fn complete(&self, system: &str, messages: &[ChatMessage]) -> ProviderResult<String> {
        let system = system.trim();
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: (!system.is_empty()).then_some(system),
            messages,
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        let timeout = self.config.request_timeout;

        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::timeout(format!(
                        "Completion request timed out after {}s",
                        timeout.as_secs()
                    ))
                } else {
                    ProviderError::network(format!("Completion request failed: {err}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(format!(
                    "Completion request timed out after {}s",
                    timeout.as_secs()
                ))
            } else {
                ProviderError::parse("Failed to read completion response body")
            }
        })?;

        if !status.is_success() {
            return Err(ProviderError::http_status(status.as_u16(), &body));
        }

        let payload: MessagesResponse = serde_json::from_str(&body)
            .map_err(|_| ProviderError::parse("Failed to decode completion response"))?;

        let text: String = payload
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::parse("Completion contained no text"));
        }

        Ok(trimmed.to_string())
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::MessagesResponse;

    #[test]
    fn response_text_blocks_deserialize() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hola, soy el tutor."}],
            "model": "claude-haiku-4-5",
            "stop_reason": "end_turn"
        }"#;
        let payload: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(payload.content.len(), 1);
        assert_eq!(payload.content[0].kind, "text");
        assert_eq!(payload.content[0].text.as_deref(), Some("Hola, soy el tutor."));
    }
}
