//! LLM provider client
//!
//! Every model call in the service goes through [`LlmProvider`], so tests can
//! swap the OpenAI-compatible client for a scripted fake.

use async_trait::async_trait;
use ca_common::config::LlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// LLM client errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM provider not configured: missing API key")]
    NotConfigured,

    #[error("LLM request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Timeouts, network failures, throttling and 5xx are worth retrying
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout | LlmError::Network(_) => true,
            LlmError::Provider { status, .. } => *status == 429 || *status >= 500,
            LlmError::NotConfigured | LlmError::InvalidResponse(_) => false,
        }
    }
}

/// Shape the model is asked to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub response_format: ResponseFormat,
    pub temperature: f32,
}

impl GenerateOptions {
    pub fn json(temperature: f32) -> Self {
        Self {
            response_format: ResponseFormat::Json,
            temperature,
        }
    }

    pub fn text(temperature: f32) -> Self {
        Self {
            response_format: ResponseFormat::Text,
            temperature,
        }
    }
}

/// A chat-completion style model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one system + user prompt pair and return the raw completion text
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: options.temperature,
            response_format: match options.response_format {
                ResponseFormat::Json => Some(serde_json::json!({ "type": "json_object" })),
                ResponseFormat::Text => None,
            },
        };

        tracing::debug!(model = %self.model, url = %self.endpoint(), "Calling LLM provider");

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("completion has no content".to_string()))
    }
}
