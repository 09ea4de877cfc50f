//! Schema field discovery.
//!
//! The index schema is not guaranteed to use fixed field names, so the
//! physical fields behind each logical concept (author, content type,
//! title, ...) are discovered at runtime: one lightweight probe query
//! fetches a single document and its key set is matched against per-concept
//! synonym lists.
//!
//! Discovery runs at most once per process. Concurrent first callers share
//! a single in-flight probe; a failed probe memoizes an empty mapping and
//! callers treat unmapped fields as "filter/facet unavailable".

use crate::types::{SearchBackend, SearchRequest};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Logical document concepts the pipeline needs physical fields for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalField {
    Id,
    Author,
    ContentType,
    Extension,
    Title,
    LastModified,
    Size,
}

/// All logical fields, in discovery order.
pub const LOGICAL_FIELDS: [LogicalField; 7] = [
    LogicalField::Id,
    LogicalField::Author,
    LogicalField::ContentType,
    LogicalField::Extension,
    LogicalField::Title,
    LogicalField::LastModified,
    LogicalField::Size,
];

impl LogicalField {
    /// Synonym substrings for this concept, highest priority first.
    ///
    /// A physical field maps to this concept when its lowercased name
    /// contains one of these; earlier synonyms win over later ones.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            LogicalField::Id => &["storage_path", "path", "parent_id", "document_id", "id", "key"],
            LogicalField::Author => &["author", "creator", "writer", "owner", "by"],
            LogicalField::ContentType => &[
                "content_type",
                "contenttype",
                "document_type",
                "documenttype",
                "category",
                "mime",
            ],
            LogicalField::Extension => &["extension", "file_type", "filetype"],
            LogicalField::Title => &["title", "name", "subject", "heading"],
            LogicalField::LastModified => &[
                "last_modified",
                "lastmodified",
                "modified",
                "updated",
                "update_date",
                "date",
            ],
            LogicalField::Size => &["size", "content_length", "bytes", "length"],
        }
    }

    /// Human-readable concept name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalField::Id => "id",
            LogicalField::Author => "author",
            LogicalField::ContentType => "contentType",
            LogicalField::Extension => "extension",
            LogicalField::Title => "title",
            LogicalField::LastModified => "lastModified",
            LogicalField::Size => "size",
        }
    }
}

/// Discovered mapping from logical concepts to physical index fields.
///
/// "Unmapped" is represented explicitly; callers never guess a literal
/// field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    id: Option<String>,
    author: Option<String>,
    content_type: Option<String>,
    extension: Option<String>,
    title: Option<String>,
    last_modified: Option<String>,
    size: Option<String>,
}

impl FieldMap {
    /// The physical field mapped to a logical concept, if discovered.
    pub fn get(&self, field: LogicalField) -> Option<&str> {
        match field {
            LogicalField::Id => self.id.as_deref(),
            LogicalField::Author => self.author.as_deref(),
            LogicalField::ContentType => self.content_type.as_deref(),
            LogicalField::Extension => self.extension.as_deref(),
            LogicalField::Title => self.title.as_deref(),
            LogicalField::LastModified => self.last_modified.as_deref(),
            LogicalField::Size => self.size.as_deref(),
        }
    }

    fn set(&mut self, field: LogicalField, physical: String) {
        let slot = match field {
            LogicalField::Id => &mut self.id,
            LogicalField::Author => &mut self.author,
            LogicalField::ContentType => &mut self.content_type,
            LogicalField::Extension => &mut self.extension,
            LogicalField::Title => &mut self.title,
            LogicalField::LastModified => &mut self.last_modified,
            LogicalField::Size => &mut self.size,
        };
        *slot = Some(physical);
    }

    /// Whether discovery produced no mapping at all.
    pub fn is_empty(&self) -> bool {
        LOGICAL_FIELDS.iter().all(|field| self.get(*field).is_none())
    }

    /// Match a key set against the synonym lists.
    ///
    /// Keys are considered in the order given; pass them sorted for
    /// deterministic results. Backend annotation keys (`@`-prefixed) are
    /// ignored.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let keys: Vec<(String, &str)> = keys
            .into_iter()
            .filter(|key| !key.starts_with('@'))
            .map(|key| (key.to_lowercase(), key))
            .collect();

        let mut map = Self::default();

        for field in LOGICAL_FIELDS {
            'synonyms: for synonym in field.synonyms() {
                for (lowered, original) in &keys {
                    if lowered.contains(synonym) {
                        map.set(field, (*original).to_string());
                        break 'synonyms;
                    }
                }
            }
        }

        map
    }
}

/// Lazily discovers and memoizes the [`FieldMap`] for one index.
///
/// Shared across concurrent requests; the single-flight cell collapses
/// racing first uses into one probe.
pub struct FieldResolver {
    backend: Arc<dyn SearchBackend>,
    cell: OnceCell<FieldMap>,
}

impl FieldResolver {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            cell: OnceCell::new(),
        }
    }

    /// The field mapping for the index, discovering it on first use.
    pub async fn resolve(&self) -> &FieldMap {
        self.cell.get_or_init(|| self.discover()).await
    }

    async fn discover(&self) -> FieldMap {
        let probe = SearchRequest::match_all().with_top(1);

        let results = match self.backend.search(&probe).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Schema discovery probe failed, leaving fields unmapped: {}", e);
                return FieldMap::default();
            }
        };

        let Some(sample) = results.hits.first() else {
            tracing::warn!("Schema discovery found an empty index, leaving fields unmapped");
            return FieldMap::default();
        };

        let mut keys: Vec<&str> = sample.fields.keys().map(String::as_str).collect();
        keys.sort_unstable();

        let map = FieldMap::from_keys(keys);
        for field in LOGICAL_FIELDS {
            match map.get(field) {
                Some(physical) => {
                    tracing::debug!("Resolved {} -> {}", field.name(), physical);
                }
                None => tracing::debug!("No physical field found for {}", field.name()),
            }
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawHit, SearchResults};
    use docquery_core::ServiceError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_from_keys_matches_storage_style_schema() {
        let map = FieldMap::from_keys([
            "content",
            "merged_content",
            "metadata_author",
            "metadata_storage_content_type",
            "metadata_storage_last_modified",
            "metadata_storage_name",
            "metadata_storage_path",
            "metadata_storage_size",
        ]);

        assert_eq!(map.get(LogicalField::Id), Some("metadata_storage_path"));
        assert_eq!(map.get(LogicalField::Author), Some("metadata_author"));
        assert_eq!(
            map.get(LogicalField::ContentType),
            Some("metadata_storage_content_type")
        );
        assert_eq!(map.get(LogicalField::Title), Some("metadata_storage_name"));
        assert_eq!(
            map.get(LogicalField::LastModified),
            Some("metadata_storage_last_modified")
        );
        assert_eq!(map.get(LogicalField::Size), Some("metadata_storage_size"));
        assert_eq!(map.get(LogicalField::Extension), None);
    }

    #[test]
    fn test_from_keys_matches_chunked_schema() {
        let map = FieldMap::from_keys([
            "author",
            "chunk",
            "chunk_id",
            "document_title",
            "extension",
            "parent_id",
            "update_date",
        ]);

        assert_eq!(map.get(LogicalField::Id), Some("parent_id"));
        assert_eq!(map.get(LogicalField::Author), Some("author"));
        assert_eq!(map.get(LogicalField::Extension), Some("extension"));
        assert_eq!(map.get(LogicalField::Title), Some("document_title"));
        assert_eq!(map.get(LogicalField::LastModified), Some("update_date"));
    }

    #[test]
    fn test_synonym_priority_beats_key_order() {
        // "category" sorts before "documentType" but is a lower-priority
        // synonym for the contentType concept.
        let map = FieldMap::from_keys(["category", "documentType"]);
        assert_eq!(map.get(LogicalField::ContentType), Some("documentType"));
    }

    #[test]
    fn test_from_keys_ignores_annotation_keys() {
        let map = FieldMap::from_keys(["@search.score", "author"]);
        assert_eq!(map.get(LogicalField::Author), Some("author"));
        assert_eq!(map.get(LogicalField::Size), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let map = FieldMap::from_keys(["Documentid", "TITLE"]);
        assert_eq!(map.get(LogicalField::Id), Some("Documentid"));
        assert_eq!(map.get(LogicalField::Title), Some("TITLE"));
    }

    #[test]
    fn test_empty_key_set_maps_nothing() {
        let map = FieldMap::from_keys([]);
        assert!(map.is_empty());
    }

    /// Probe-counting backend for memoization tests.
    struct CountingBackend {
        probes: AtomicUsize,
        hits: Vec<RawHit>,
        fail: bool,
    }

    impl CountingBackend {
        fn with_sample() -> Self {
            let mut fields = serde_json::Map::new();
            fields.insert("author".to_string(), json!("Jordan"));
            fields.insert("content".to_string(), json!("text"));
            Self {
                probes: AtomicUsize::new(0),
                hits: vec![RawHit {
                    fields,
                    score: 1.0,
                    highlights: None,
                }],
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                probes: AtomicUsize::new(0),
                hits: Vec::new(),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl SearchBackend for CountingBackend {
        fn backend_name(&self) -> &str {
            "counting"
        }

        async fn search(
            &self,
            _request: &SearchRequest,
        ) -> docquery_core::ServiceResult<SearchResults> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ServiceError::Search("index unavailable".into()));
            }
            Ok(SearchResults {
                hits: self.hits.clone(),
                facets: Default::default(),
                total: Some(self.hits.len() as u64),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_use_issues_one_probe() {
        let backend = Arc::new(CountingBackend::with_sample());
        let resolver = Arc::new(FieldResolver::new(backend.clone()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve().await.clone() })
            })
            .collect();

        for task in tasks {
            let map = task.await.unwrap();
            assert_eq!(map.get(LogicalField::Author), Some("author"));
        }

        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_memoizes_empty_mapping() {
        let backend = Arc::new(CountingBackend::failing());
        let resolver = FieldResolver::new(backend.clone());

        assert!(resolver.resolve().await.is_empty());
        assert!(resolver.resolve().await.is_empty());
        // The failure is memoized, not retried per call.
        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    }
}
