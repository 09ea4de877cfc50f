//! Generation backend abstraction and request/response types.
//!
//! The generation backend consumes an ordered list of role-tagged messages
//! and returns generated text with a completion-status flag. The trait lets
//! the pipeline and its tests substitute fakes for the HTTP provider.

use docquery_core::ServiceResult;
use serde::{Deserialize, Serialize};

/// Message role in a chat exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Ordered messages forming the prompt
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a request from ordered messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished its answer
    Stop,
    /// Output was cut off at the token limit
    Length,
    /// Any other backend-reported reason
    Other(String),
}

impl FinishReason {
    /// Whether generation completed normally.
    pub fn is_normal_stop(&self) -> bool {
        matches!(self, FinishReason::Stop)
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

/// Generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated text
    pub content: String,

    /// Model that produced the response
    pub model: String,

    /// Token usage for the exchange
    pub usage: TokenUsage,

    /// Completion status reported by the backend
    pub finish: FinishReason,
}

/// The generation backend boundary.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Name of the backend, for logs and error attribution.
    fn backend_name(&self) -> &str;

    /// Perform a completion.
    async fn complete(&self, request: &ChatRequest) -> ServiceResult<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You answer questions."),
            ChatMessage::user("What changed last quarter?"),
        ])
        .with_temperature(0.7)
        .with_max_tokens(2000);

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(2000));
    }

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let rendered = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(rendered["role"], "user");
    }

    #[test]
    fn test_finish_reason_normal_stop() {
        assert!(FinishReason::Stop.is_normal_stop());
        assert!(!FinishReason::Length.is_normal_stop());
        assert!(!FinishReason::Other("content_filter".into()).is_normal_stop());
    }
}
