//! Search backend request/response types.
//!
//! The index is a remote service with an uncertain schema, so a hit is an
//! arbitrary field bag rather than a fixed struct. Everything downstream of
//! the backend boundary works against [`RawHit`] and lets the normalizer
//! impose shape.

use docquery_core::ServiceResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A search request against the document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text; `"*"` matches all documents
    pub query: String,

    /// Backend filter expression, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Maximum number of hits to return
    pub top: u32,

    /// Facet field specs (e.g. `"author,count:50"`) to aggregate
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub facets: Vec<String>,

    /// Request the backend's total match count
    #[serde(default)]
    pub include_total: bool,
}

impl SearchRequest {
    /// Create a request for a query with default settings.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filter: None,
            top: 10,
            facets: Vec::new(),
            include_total: false,
        }
    }

    /// Create a match-all request.
    pub fn match_all() -> Self {
        Self::new("*")
    }

    /// Set the filter expression. An empty expression imposes no filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filter = Some(filter);
        }
        self
    }

    /// Set the maximum number of hits.
    pub fn with_top(mut self, top: u32) -> Self {
        self.top = top;
        self
    }

    /// Add a facet field spec.
    pub fn with_facet(mut self, facet: impl Into<String>) -> Self {
        self.facets.push(facet.into());
        self
    }

    /// Request the total match count.
    pub fn with_total(mut self) -> Self {
        self.include_total = true;
        self
    }
}

/// One matched item as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHit {
    /// Arbitrary field name/value bag for the matched document
    pub fields: Map<String, Value>,

    /// Backend-assigned relevance score (unbounded, backend-specific scale)
    pub score: f64,

    /// Highlight fragments keyed by field, when the backend provides them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Map<String, Value>>,
}

impl RawHit {
    /// Look up a field value by exact name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Look up a field value by name, ignoring ASCII case.
    pub fn get_ignore_case(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    }
}

/// One (value, count) pair from a facet histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
}

/// The backend's response to a search request.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Matched hits in backend rank order
    pub hits: Vec<RawHit>,

    /// Facet histograms keyed by physical field name
    pub facets: HashMap<String, Vec<FacetValue>>,

    /// Total match count, when requested and provided
    pub total: Option<u64>,
}

/// The search backend boundary.
///
/// Abstracts the remote index so the pipeline and its tests can substitute
/// fakes without network access.
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Name of the backend, for logs and error attribution.
    fn backend_name(&self) -> &str;

    /// Execute a search request.
    async fn search(&self, request: &SearchRequest) -> ServiceResult<SearchResults>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("expansion risk")
            .with_filter("author eq 'Jordan'")
            .with_top(5)
            .with_facet("author,count:50")
            .with_total();

        assert_eq!(request.query, "expansion risk");
        assert_eq!(request.filter.as_deref(), Some("author eq 'Jordan'"));
        assert_eq!(request.top, 5);
        assert_eq!(request.facets, vec!["author,count:50".to_string()]);
        assert!(request.include_total);
    }

    #[test]
    fn test_empty_filter_imposes_no_constraint() {
        let request = SearchRequest::new("q").with_filter("");
        assert!(request.filter.is_none());
    }

    #[test]
    fn test_match_all() {
        assert_eq!(SearchRequest::match_all().query, "*");
    }

    #[test]
    fn test_hit_case_insensitive_lookup() {
        let mut fields = Map::new();
        fields.insert("Document_Title".to_string(), json!("Q3 Outlook"));
        let hit = RawHit {
            fields,
            score: 1.0,
            highlights: None,
        };

        assert!(hit.get("document_title").is_none());
        assert_eq!(
            hit.get_ignore_case("document_title"),
            Some(&json!("Q3 Outlook"))
        );
    }
}
