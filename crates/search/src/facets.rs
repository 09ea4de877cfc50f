//! Facet aggregation.
//!
//! Converts raw per-field facet histograms into the three canonical groups
//! used to populate filter UI. Pure conversion: an unmapped or absent group
//! is an empty sequence, never an error.

use crate::fields::{FieldMap, LogicalField};
use crate::types::FacetValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The available filter values, one group per filterable concept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub authors: Vec<FacetValue>,
    pub categories: Vec<FacetValue>,
    pub document_types: Vec<FacetValue>,
}

/// Aggregate raw histograms into the canonical facet groups.
pub fn aggregate_facets(
    raw: &HashMap<String, Vec<FacetValue>>,
    fields: &FieldMap,
) -> FilterOptions {
    FilterOptions {
        authors: group_for(raw, fields, LogicalField::Author),
        categories: group_for(raw, fields, LogicalField::ContentType),
        document_types: group_for(raw, fields, LogicalField::Extension)
            .into_iter()
            .map(|facet| FacetValue {
                value: clean_doc_type(&facet.value),
                count: facet.count,
            })
            .collect(),
    }
}

fn group_for(
    raw: &HashMap<String, Vec<FacetValue>>,
    fields: &FieldMap,
    field: LogicalField,
) -> Vec<FacetValue> {
    fields
        .get(field)
        .and_then(|physical| raw.get(physical))
        .cloned()
        .unwrap_or_default()
}

/// Normalize a document-type facet value: strip a leading dot, uppercase.
fn clean_doc_type(value: &str) -> String {
    value.trim_start_matches('.').to_uppercase()
}
