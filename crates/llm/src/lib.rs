//! Generation backend boundary for docquery.
//!
//! Provider-agnostic abstraction over the text-generation service: ordered
//! role-tagged messages in, generated text with token usage and a
//! completion-status flag out.
//!
//! # Example
//! ```no_run
//! use docquery_llm::{ChatCompletionsClient, ChatMessage, ChatRequest, GenerationBackend};
//!
//! # async fn example(config: &docquery_core::AppConfig) -> docquery_core::ServiceResult<()> {
//! let client = ChatCompletionsClient::new(config);
//! let request = ChatRequest::new(vec![ChatMessage::user("Hello")]);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod providers;

// Re-export main types
pub use client::{
    ChatMessage, ChatRequest, ChatResponse, FinishReason, GenerationBackend, Role, TokenUsage,
};
pub use providers::ChatCompletionsClient;
