//! Search backend boundary for docquery.
//!
//! Everything between a query and a normalized document list:
//! - HTTP client for the remote document index
//! - Filter expression building from structured criteria
//! - Runtime schema field discovery (the index schema is not fixed)
//! - Raw-hit normalization into canonical documents
//! - Facet aggregation for filter UI

pub mod client;
pub mod document;
pub mod facets;
pub mod fields;
pub mod filter;
pub mod types;

// Re-export commonly used types
pub use client::HttpSearchClient;
pub use document::{display_relevance, format_bytes, normalize, Document, DocumentStatus};
pub use facets::{aggregate_facets, FilterOptions};
pub use fields::{FieldMap, FieldResolver, LogicalField};
pub use filter::{build_filter_expression, DateRange, FilterCriteria};
pub use types::{FacetValue, RawHit, SearchBackend, SearchRequest, SearchResults};
