//! HTTP chat-completions provider.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint scoped to a
//! model deployment:
//! `POST {endpoint}/deployments/{deployment}/chat/completions?api-version={v}`
//! with an `api-key` header.

use crate::client::{
    ChatMessage, ChatRequest, ChatResponse, FinishReason, GenerationBackend, TokenUsage,
};
use docquery_core::{AppConfig, Service, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on one completion round trip. Generation is slower than
/// search, so the bound is looser.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Wire format for a completion request.
#[derive(Debug, Serialize)]
struct WireChatRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Wire format for a completion response.
#[derive(Debug, Deserialize)]
struct WireChatResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// HTTP generation client for a chat-completions deployment.
pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a client from validated application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            endpoint: config.generation_endpoint.trim_end_matches('/').to_string(),
            api_key: config.generation_api_key.clone(),
            deployment: config.generation_deployment.clone(),
            api_version: config.generation_api_version.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn convert_response(&self, response: WireChatResponse) -> ServiceResult<ChatResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Generation("Backend returned no choices".to_string()))?;

        let finish = match choice.finish_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            Some(other) => FinishReason::Other(other.to_string()),
            None => FinishReason::Other("unknown".to_string()),
        };

        let usage = response
            .usage
            .map(|usage| TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response
                .model
                .unwrap_or_else(|| self.deployment.clone()),
            usage,
            finish,
        })
    }
}

#[async_trait::async_trait]
impl GenerationBackend for ChatCompletionsClient {
    fn backend_name(&self) -> &str {
        "generation"
    }

    async fn complete(&self, request: &ChatRequest) -> ServiceResult<ChatResponse> {
        tracing::debug!(
            messages = request.messages.len(),
            "Sending completion request"
        );

        let wire_request = WireChatRequest {
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .timeout(REQUEST_TIMEOUT)
            .header("api-key", &self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ServiceError::Network {
                service: Service::Generation,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Generation(format!(
                "Backend rejected the request ({}): {}",
                status, error_text
            )));
        }

        let wire_response: WireChatResponse = response.json().await.map_err(|e| {
            ServiceError::Generation(format!("Failed to parse completion response: {}", e))
        })?;

        let converted = self.convert_response(wire_response)?;
        tracing::debug!(
            tokens = converted.usage.total_tokens,
            finish = ?converted.finish,
            "Completion received"
        );

        Ok(converted)
    }
}
