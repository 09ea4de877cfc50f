//! Command handlers for the docquery CLI.

mod ask;
mod filters;
mod health;

pub use ask::AskCommand;
pub use filters::FiltersCommand;
pub use health::HealthCommand;

use docquery_core::AppConfig;
use docquery_llm::ChatCompletionsClient;
use docquery_rag::Pipeline;
use docquery_search::HttpSearchClient;
use std::sync::Arc;

/// Wire the HTTP backends into a pipeline.
pub(crate) fn build_pipeline(config: &AppConfig) -> Pipeline {
    let search = Arc::new(HttpSearchClient::new(config));
    let generation = Arc::new(ChatCompletionsClient::new(config));
    Pipeline::new(search, generation)
}
