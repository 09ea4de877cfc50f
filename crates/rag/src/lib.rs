//! Retrieval-augmented query pipeline for docquery.
//!
//! Orchestrates the search and generation backends into answers with
//! citations and a bounded confidence estimate:
//! - Context assembly with a content-availability fallback policy
//! - Confidence scoring from retrieval signal and completion status
//! - The end-to-end pipeline with a connectivity self-test

pub mod confidence;
pub mod context;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use confidence::score_confidence;
pub use context::{assemble_context, AssembledContext};
pub use pipeline::{ConnectionStatus, Pipeline};
pub use types::{QueryOptions, RagResult, Source};
