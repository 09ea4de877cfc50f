//! HTTP client for the search backend.
//!
//! Talks to the index's REST search endpoint:
//! `POST {endpoint}/indexes/{index}/docs/search?api-version={v}` with an
//! `api-key` header. Transport failures are reported as network errors,
//! distinct from errors the backend itself returns.

use crate::types::{FacetValue, RawHit, SearchBackend, SearchRequest, SearchResults};
use docquery_core::{AppConfig, Service, ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Upper bound on one search round trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire format for a search request.
#[derive(Debug, Serialize)]
struct WireSearchRequest<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    top: u32,
    count: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    facets: Option<&'a [String]>,
    #[serde(rename = "searchMode")]
    search_mode: &'a str,
}

/// Wire format for a search response.
#[derive(Debug, Deserialize)]
struct WireSearchResponse {
    #[serde(default)]
    value: Vec<Map<String, Value>>,
    #[serde(rename = "@search.facets", default)]
    facets: Option<Map<String, Value>>,
    #[serde(rename = "@odata.count", default)]
    count: Option<u64>,
}

/// HTTP search client for the document index.
pub struct HttpSearchClient {
    endpoint: String,
    api_key: String,
    index: String,
    api_version: String,
    client: reqwest::Client,
}

impl HttpSearchClient {
    /// Create a client from validated application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            endpoint: config.search_endpoint.trim_end_matches('/').to_string(),
            api_key: config.search_api_key.clone(),
            index: config.search_index.clone(),
            api_version: config.search_api_version.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index, self.api_version
        )
    }

    fn to_wire_request<'a>(&self, request: &'a SearchRequest) -> WireSearchRequest<'a> {
        WireSearchRequest {
            search: &request.query,
            filter: request.filter.as_deref(),
            top: request.top,
            count: request.include_total,
            facets: if request.facets.is_empty() {
                None
            } else {
                Some(&request.facets)
            },
            search_mode: "all",
        }
    }

    fn convert_response(&self, response: WireSearchResponse) -> SearchResults {
        let hits = response.value.into_iter().map(convert_hit).collect();

        let facets = response
            .facets
            .map(convert_facet_histograms)
            .unwrap_or_default();

        SearchResults {
            hits,
            facets,
            total: response.count,
        }
    }
}

/// Split one wire hit into document fields and backend annotations.
///
/// Keys prefixed with `@` are backend annotations, not index fields; the
/// score and highlights are lifted out and the rest are dropped.
fn convert_hit(mut item: Map<String, Value>) -> RawHit {
    let score = item
        .get("@search.score")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let highlights = item
        .remove("@search.highlights")
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        });

    item.retain(|key, _| !key.starts_with('@'));

    RawHit {
        fields: item,
        score,
        highlights,
    }
}

/// Convert raw facet histograms, skipping entries with unexpected shapes.
fn convert_facet_histograms(raw: Map<String, Value>) -> HashMap<String, Vec<FacetValue>> {
    let mut facets = HashMap::new();

    for (field, entries) in raw {
        let Some(entries) = entries.as_array() else {
            continue;
        };

        let values: Vec<FacetValue> = entries
            .iter()
            .filter_map(|entry| {
                let value = entry.get("value")?;
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let count = entry.get("count").and_then(Value::as_u64).unwrap_or(0);
                Some(FacetValue { value, count })
            })
            .collect();

        facets.insert(field, values);
    }

    facets
}

#[async_trait::async_trait]
impl SearchBackend for HttpSearchClient {
    fn backend_name(&self) -> &str {
        "search"
    }

    async fn search(&self, request: &SearchRequest) -> ServiceResult<SearchResults> {
        tracing::debug!(
            query = %request.query,
            top = request.top,
            filtered = request.filter.is_some(),
            "Sending search request"
        );

        let wire_request = self.to_wire_request(request);

        let response = self
            .client
            .post(self.search_url())
            .timeout(REQUEST_TIMEOUT)
            .header("api-key", &self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ServiceError::Network {
                service: Service::Search,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Search(format!(
                "Index rejected the query ({}): {}",
                status, error_text
            )));
        }

        let wire_response: WireSearchResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Search(format!("Failed to parse search response: {}", e)))?;

        let results = self.convert_response(wire_response);
        tracing::debug!(hits = results.hits.len(), "Search completed");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_client() -> HttpSearchClient {
        let config = AppConfig {
            search_endpoint: "https://search.example.net/".into(),
            search_api_key: "key".into(),
            search_index: "contracts".into(),
            search_api_version: "2024-07-01".into(),
            ..AppConfig::default()
        };
        HttpSearchClient::new(&config)
    }

    #[test]
    fn test_search_url_strips_trailing_slash() {
        let client = test_client();
        assert_eq!(
            client.search_url(),
            "https://search.example.net/indexes/contracts/docs/search?api-version=2024-07-01"
        );
    }

    #[test]
    fn test_wire_request_omits_empty_parts() {
        let client = test_client();
        let request = SearchRequest::new("budget");
        let wire = client.to_wire_request(&request);
        let rendered = serde_json::to_value(&wire).unwrap();

        assert_eq!(rendered["search"], "budget");
        assert_eq!(rendered["searchMode"], "all");
        assert!(rendered.get("filter").is_none());
        assert!(rendered.get("facets").is_none());
    }

    #[test]
    fn test_convert_hit_separates_annotations() {
        let item = json!({
            "@search.score": 8.25,
            "@search.highlights": {"content": ["a <em>match</em>"]},
            "content": "body text",
            "author": "Jordan"
        });
        let Value::Object(item) = item else {
            unreachable!()
        };

        let hit = convert_hit(item);
        assert_eq!(hit.score, 8.25);
        assert!(hit.highlights.is_some());
        assert_eq!(hit.fields.len(), 2);
        assert!(hit.get("@search.score").is_none());
        assert_eq!(hit.get("author"), Some(&json!("Jordan")));
    }

    #[test]
    fn test_convert_hit_defaults_missing_score() {
        let Value::Object(item) = json!({"content": "text"}) else {
            unreachable!()
        };
        let hit = convert_hit(item);
        assert_eq!(hit.score, 0.0);
    }

    #[test]
    fn test_convert_facets_skips_malformed_entries() {
        let Value::Object(raw) = json!({
            "author": [
                {"value": "Jordan", "count": 12},
                {"count": 3},
                {"value": "Sam", "count": 1}
            ],
            "broken": "not an array"
        }) else {
            unreachable!()
        };

        let facets = convert_facet_histograms(raw);
        assert_eq!(facets["author"].len(), 2);
        assert_eq!(facets["author"][0].value, "Jordan");
        assert_eq!(facets["author"][0].count, 12);
        assert!(!facets.contains_key("broken"));
    }
}
