//! Filter expression builder.
//!
//! Translates structured filter criteria into the index's boolean predicate
//! syntax: per-criterion OR-disjunctions of `field eq 'value'` comparisons,
//! joined with `and`. A criterion whose logical field could not be resolved
//! is dropped rather than failing the query; an unresolvable filter must
//! never block retrieval.

use crate::fields::{FieldMap, LogicalField};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An optionally open calendar date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Structured filter criteria for a query.
///
/// An empty criterion imposes no constraint; it never silently matches
/// nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Restrict to these authors
    #[serde(default)]
    pub authors: Vec<String>,

    /// Restrict to these content categories
    #[serde(default)]
    pub categories: Vec<String>,

    /// Restrict to these document-type extensions
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Restrict to documents last modified within this range
    #[serde(default)]
    pub date_range: Option<DateRange>,

    /// Restrict to an explicit document-id allowlist
    #[serde(default)]
    pub document_ids: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = Some(DateRange { start, end });
        self
    }

    pub fn with_document_ids(mut self, document_ids: Vec<String>) -> Self {
        self.document_ids = document_ids;
        self
    }

    /// Whether no criterion is set at all.
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
            && self.categories.is_empty()
            && self.extensions.is_empty()
            && self.document_ids.is_empty()
            && self
                .date_range
                .as_ref()
                .map(|range| range.start.is_none() && range.end.is_none())
                .unwrap_or(true)
    }
}

/// Build the backend filter expression for the given criteria.
///
/// Returns an empty string when no criterion applies.
pub fn build_filter_expression(criteria: &FilterCriteria, fields: &FieldMap) -> String {
    let mut clauses = Vec::new();

    push_equality_clause(
        &mut clauses,
        fields,
        LogicalField::Author,
        &criteria.authors,
    );
    push_equality_clause(
        &mut clauses,
        fields,
        LogicalField::ContentType,
        &criteria.categories,
    );
    push_equality_clause(
        &mut clauses,
        fields,
        LogicalField::Extension,
        &criteria.extensions,
    );
    push_equality_clause(
        &mut clauses,
        fields,
        LogicalField::Id,
        &criteria.document_ids,
    );

    if let Some(range) = &criteria.date_range {
        match fields.get(LogicalField::LastModified) {
            Some(field) => {
                // Day-floor the start and day-ceiling the end so a
                // single-day range is inclusive.
                if let Some(start) = range.start {
                    clauses.push(format!("{} ge {}T00:00:00Z", field, start));
                }
                if let Some(end) = range.end {
                    clauses.push(format!("{} le {}T23:59:59Z", field, end));
                }
            }
            None => {
                if range.start.is_some() || range.end.is_some() {
                    tracing::debug!(
                        "Dropping date-range filter: no lastModified field resolved in the index"
                    );
                }
            }
        }
    }

    let expression = clauses.join(" and ");
    if !expression.is_empty() {
        tracing::debug!("Built filter expression: {}", expression);
    }
    expression
}

/// Append one parenthesized OR-clause of equality comparisons, if the
/// criterion has values and its logical field is mapped.
fn push_equality_clause(
    clauses: &mut Vec<String>,
    fields: &FieldMap,
    field: LogicalField,
    values: &[String],
) {
    if values.is_empty() {
        return;
    }

    let Some(physical) = fields.get(field) else {
        tracing::debug!(
            "Dropping {} filter: no physical field resolved in the index",
            field.name()
        );
        return;
    };

    let comparisons: Vec<String> = values
        .iter()
        .map(|value| format!("{} eq '{}'", physical, escape_value(value)))
        .collect();

    clauses.push(format!("({})", comparisons.join(" or ")));
}

/// Escape a value for embedding in a single-quoted expression literal.
fn escape_value(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped_fields() -> FieldMap {
        FieldMap::from_keys([
            "author",
            "documentType",
            "extension",
            "last_modified",
            "storage_path",
            "title",
            "size",
        ])
    }

    #[test]
    fn test_empty_criteria_builds_empty_expression() {
        let expression = build_filter_expression(&FilterCriteria::new(), &mapped_fields());
        assert_eq!(expression, "");
    }

    #[test]
    fn test_single_author_clause() {
        let criteria = FilterCriteria::new().with_authors(vec!["Jordan Lee".into()]);
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(expression, "(author eq 'Jordan Lee')");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let criteria = FilterCriteria::new().with_authors(vec!["O'Brien".into()]);
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(expression, "(author eq 'O''Brien')");
    }

    #[test]
    fn test_multiple_values_join_with_or() {
        let criteria =
            FilterCriteria::new().with_categories(vec!["report".into(), "policy".into()]);
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(
            expression,
            "(documentType eq 'report' or documentType eq 'policy')"
        );
    }

    #[test]
    fn test_criteria_join_with_and() {
        let criteria = FilterCriteria::new()
            .with_authors(vec!["Jordan".into()])
            .with_extensions(vec!["pdf".into()]);
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(expression, "(author eq 'Jordan') and (extension eq 'pdf')");
    }

    #[test]
    fn test_date_range_floors_start_and_ceilings_end() {
        let criteria = FilterCriteria::new().with_date_range(
            NaiveDate::from_ymd_opt(2025, 3, 10),
            NaiveDate::from_ymd_opt(2025, 3, 10),
        );
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(
            expression,
            "last_modified ge 2025-03-10T00:00:00Z and last_modified le 2025-03-10T23:59:59Z"
        );
    }

    #[test]
    fn test_open_date_range_emits_single_bound() {
        let criteria =
            FilterCriteria::new().with_date_range(None, NaiveDate::from_ymd_opt(2025, 1, 31));
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(expression, "last_modified le 2025-01-31T23:59:59Z");
    }

    #[test]
    fn test_document_id_allowlist() {
        let criteria = FilterCriteria::new()
            .with_document_ids(vec!["docs/a.pdf".into(), "docs/b.pdf".into()]);
        let expression = build_filter_expression(&criteria, &mapped_fields());
        assert_eq!(
            expression,
            "(storage_path eq 'docs/a.pdf' or storage_path eq 'docs/b.pdf')"
        );
    }

    #[test]
    fn test_unmapped_criterion_is_dropped_not_fatal() {
        // No extension field in this index; the author clause must survive.
        let fields = FieldMap::from_keys(["author", "title"]);
        let criteria = FilterCriteria::new()
            .with_authors(vec!["Jordan".into()])
            .with_extensions(vec!["pdf".into()]);
        let expression = build_filter_expression(&criteria, &fields);
        assert_eq!(expression, "(author eq 'Jordan')");
    }

    #[test]
    fn test_is_empty_treats_open_range_as_empty() {
        assert!(FilterCriteria::new().is_empty());
        assert!(FilterCriteria::new().with_date_range(None, None).is_empty());
        assert!(!FilterCriteria::new()
            .with_date_range(NaiveDate::from_ymd_opt(2025, 1, 1), None)
            .is_empty());
    }
}
