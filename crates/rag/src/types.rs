//! Pipeline result types.

use crate::confidence::NO_RESULTS_CONFIDENCE;
use docquery_search::{display_relevance, Document};
use serde::{Deserialize, Serialize};

/// Canned response when retrieval matches nothing at all.
pub(crate) const NO_RESULTS_RESPONSE: &str = "I couldn't find any relevant documents for your \
     query. Please try rephrasing your question or adjusting your filters.";

/// Generation options for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Sampling temperature (0.0 - 1.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// How many documents to retrieve
    pub top_documents: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            top_documents: 10,
        }
    }
}

impl QueryOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_top_documents(mut self, top_documents: u32) -> Self {
        self.top_documents = top_documents;
        self
    }
}

/// One citation, in retrieval rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Document title
    pub name: String,

    pub author: String,

    /// Raw backend relevance score
    pub relevance: f64,

    /// Presentation-only relevance in [0, 1]; never used for ordering
    pub display_relevance: f64,

    pub doc_type: String,

    pub category: String,

    /// Stable document identifier
    pub id: String,
}

impl Source {
    pub fn from_document(document: &Document) -> Self {
        Self {
            name: document.title.clone(),
            author: document.author.clone(),
            relevance: document.score,
            display_relevance: display_relevance(document.score),
            doc_type: document.doc_type.clone(),
            category: document.category.clone(),
            id: document.id.clone(),
        }
    }
}

/// The answer to one query, with citations and a confidence estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResult {
    /// Generated response text
    pub response: String,

    /// Citations in retrieval rank order, one per retrieved document
    pub sources: Vec<Source>,

    /// Bounded heuristic reliability estimate in [0, 1]
    pub confidence: f64,

    /// Total tokens reported by the generation backend
    pub tokens: u32,

    /// Wall-clock processing time in seconds
    pub processing_time: f64,

    /// Model identifier that produced the response
    pub model: String,
}

impl RagResult {
    /// The short-circuit result when retrieval matches nothing.
    ///
    /// Generation is skipped entirely; this is a successful empty answer,
    /// distinct from a failed request.
    pub fn no_documents(processing_time: f64) -> Self {
        Self {
            response: NO_RESULTS_RESPONSE.to_string(),
            sources: Vec::new(),
            confidence: NO_RESULTS_CONFIDENCE,
            tokens: 0,
            processing_time,
            model: "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, 2000);
        assert_eq!(options.top_documents, 10);
    }

    #[test]
    fn test_no_documents_result() {
        let result = RagResult::no_documents(0.05);
        assert!(result.sources.is_empty());
        assert_eq!(result.confidence, NO_RESULTS_CONFIDENCE);
        assert_eq!(result.tokens, 0);
        assert_eq!(result.model, "none");
        assert!(result.response.contains("couldn't find"));
    }

    #[test]
    fn test_source_carries_raw_and_display_relevance() {
        let document = Document {
            id: "docs/q3.pdf".into(),
            title: "Q3 Outlook".into(),
            content: String::new(),
            author: "Jordan".into(),
            category: "Document".into(),
            doc_type: "PDF".into(),
            last_modified: None,
            size: "0 Bytes".into(),
            score: 8.2,
            status: docquery_search::DocumentStatus::ContentUnavailable,
            metadata: serde_json::Map::new(),
        };

        let source = Source::from_document(&document);
        assert_eq!(source.relevance, 8.2);
        assert!((source.display_relevance - 0.82).abs() < 1e-9);
        assert_eq!(source.name, "Q3 Outlook");
    }
}
