//! Pipeline orchestration.
//!
//! Sequences one query end to end: resolve schema fields (memoized) →
//! build filter expression → search → normalize hits → assemble context →
//! generate → score confidence → cite. No step retries automatically;
//! backend failures surface immediately, tagged with their service.

use crate::confidence::score_confidence;
use crate::context::assemble_context;
use crate::types::{QueryOptions, RagResult, Source};
use docquery_llm::{ChatMessage, ChatRequest, GenerationBackend};
use docquery_search::{
    aggregate_facets, build_filter_expression, normalize, Document, FieldResolver, FilterCriteria,
    FilterOptions, LogicalField, SearchBackend, SearchRequest,
};
use docquery_core::ServiceResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Facet spec suffix: how many values to request per group.
const FACET_VALUE_LIMIT: u32 = 50;

/// Per-backend health from the connectivity self-test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub search_healthy: bool,
    pub generation_healthy: bool,
    pub errors: Vec<String>,
}

/// The retrieval-augmented query pipeline.
///
/// Holds no per-request state; safe to share across concurrent queries.
/// The only shared mutable state is the memoized field mapping inside the
/// resolver, which collapses concurrent first uses into one probe.
pub struct Pipeline {
    search: Arc<dyn SearchBackend>,
    generation: Arc<dyn GenerationBackend>,
    resolver: FieldResolver,
}

impl Pipeline {
    pub fn new(search: Arc<dyn SearchBackend>, generation: Arc<dyn GenerationBackend>) -> Self {
        let resolver = FieldResolver::new(search.clone());
        Self {
            search,
            generation,
            resolver,
        }
    }

    /// Answer a query against the document index.
    ///
    /// Returns `Ok` with a well-formed result for both answered queries and
    /// the no-results case; `Err` means a backend or pipeline failure.
    pub async fn process_query(
        &self,
        query: &str,
        filters: &FilterCriteria,
        options: &QueryOptions,
    ) -> ServiceResult<RagResult> {
        let start = Instant::now();
        tracing::info!("Processing query: '{}'", query);

        let fields = self.resolver.resolve().await;
        let expression = build_filter_expression(filters, fields);

        let search_query = if query.trim().is_empty() { "*" } else { query };
        let request = SearchRequest::new(search_query)
            .with_filter(expression)
            .with_top(options.top_documents);

        let results = self.search.search(&request).await?;

        if results.hits.is_empty() {
            tracing::info!("No documents matched; skipping generation");
            return Ok(RagResult::no_documents(start.elapsed().as_secs_f64()));
        }

        // Hits stay in backend rank order through every later stage.
        let documents: Vec<Document> = results
            .hits
            .iter()
            .map(|hit| normalize(hit, fields))
            .collect();

        let context = assemble_context(&documents)?;
        tracing::info!(
            "Retrieved {} documents, {} usable in context",
            documents.len(),
            context.document_count
        );

        let chat_request = ChatRequest::new(vec![
            ChatMessage::system(&context.system_prompt),
            ChatMessage::user(query),
        ])
        .with_temperature(options.temperature)
        .with_max_tokens(options.max_tokens);

        let response = self.generation.complete(&chat_request).await?;

        let scores: Vec<f64> = documents.iter().map(|d| d.score).collect();
        let confidence = score_confidence(
            &scores,
            response.finish.is_normal_stop(),
            context.used_content,
        );

        let sources: Vec<Source> = documents.iter().map(Source::from_document).collect();
        let processing_time = start.elapsed().as_secs_f64();

        tracing::info!(
            "Query processed in {:.2}s: {} sources, {} tokens, {:.2} confidence",
            processing_time,
            sources.len(),
            response.usage.total_tokens,
            confidence
        );

        Ok(RagResult {
            response: response.content,
            sources,
            confidence,
            tokens: response.usage.total_tokens,
            processing_time,
            model: response.model,
        })
    }

    /// The filter values available in the index, grouped per concept.
    ///
    /// Each group is fetched independently; one failed fetch leaves that
    /// group empty without affecting the others.
    pub async fn available_filters(&self) -> FilterOptions {
        let fields = self.resolver.resolve().await;
        let mut raw = HashMap::new();

        for logical in [
            LogicalField::Author,
            LogicalField::ContentType,
            LogicalField::Extension,
        ] {
            let Some(physical) = fields.get(logical) else {
                continue;
            };

            let request = SearchRequest::match_all()
                .with_top(0)
                .with_facet(format!("{},count:{}", physical, FACET_VALUE_LIMIT));

            match self.search.search(&request).await {
                Ok(results) => raw.extend(results.facets),
                Err(e) => {
                    tracing::warn!("Failed to fetch {} facets: {}", logical.name(), e);
                }
            }
        }

        aggregate_facets(&raw, fields)
    }

    /// Probe both backends independently.
    ///
    /// The probes run concurrently and a failure in one never prevents
    /// testing the other.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let search_probe = async {
            let request = SearchRequest::new("test").with_top(1);
            self.search.search(&request).await.map(|_| ())
        };

        let generation_probe = async {
            let request =
                ChatRequest::new(vec![ChatMessage::user("Hello")]).with_max_tokens(10);
            self.generation.complete(&request).await.map(|_| ())
        };

        let (search_result, generation_result) = futures::join!(search_probe, generation_probe);

        let mut status = ConnectionStatus::default();

        match search_result {
            Ok(()) => status.search_healthy = true,
            Err(e) => status.errors.push(format!("search: {}", e)),
        }

        match generation_result {
            Ok(()) => status.generation_healthy = true,
            Err(e) => status.errors.push(format!("generation: {}", e)),
        }

        status
    }
}
