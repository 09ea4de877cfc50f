//! Document normalization.
//!
//! Maps a raw search hit (arbitrary key/value bag) into the canonical
//! [`Document`] entity. Pure functions, no I/O: missing or malformed
//! optional fields get defaults, never errors.

use crate::fields::{FieldMap, LogicalField};
use crate::types::RawHit;
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder when no title can be extracted or derived.
const DEFAULT_TITLE: &str = "Untitled Document";

/// Author substituted when the index carries none.
const DEFAULT_AUTHOR: &str = "Unknown";

/// Generic category label substituted when the index carries none.
const DEFAULT_CATEGORY: &str = "Document";

/// Type token substituted when no extension can be determined.
const DEFAULT_TYPE: &str = "FILE";

/// Candidate content fields, scanned in priority order. The first
/// non-empty value wins; merged/enriched fields outrank raw extraction,
/// which outranks derived summaries.
const CONTENT_FIELD_PRIORITY: [&str; 7] = [
    "merged_content",
    "content",
    "chunk",
    "text",
    "plain_text",
    "extracted_text",
    "summary",
];

/// Extensions stripped when deriving a title from a path segment.
const DOCUMENT_EXTENSIONS: [&str; 17] = [
    "pdf", "doc", "docx", "txt", "md", "rtf", "ppt", "pptx", "xls", "xlsx", "csv", "html", "htm",
    "json", "xml", "msg", "eml",
];

/// Raw scores at or above this saturate the display percentage.
const RELEVANCE_SCALE: f64 = 10.0;

/// Whether any text content could be extracted for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Ready,
    ContentUnavailable,
}

/// Canonical document entity produced from one search hit.
///
/// Immutable once built. `content` may be empty, and emptiness is
/// meaningful: it drives the context assembler's fallback path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable opaque identifier, e.g. a storage path
    pub id: String,

    /// Human-readable title, never empty
    pub title: String,

    /// Extracted text content, possibly empty
    pub content: String,

    /// Document author
    pub author: String,

    /// Content category
    pub category: String,

    /// Short uppercase type token, e.g. "PDF"
    pub doc_type: String,

    /// Last-modified timestamp, when the index carries one
    pub last_modified: Option<DateTime<Utc>>,

    /// Human-readable size string
    pub size: String,

    /// Raw backend relevance score, untouched
    pub score: f64,

    pub status: DocumentStatus,

    /// The original hit fields, retained for traceability
    pub metadata: serde_json::Map<String, Value>,
}

/// Normalize one raw hit into a [`Document`].
pub fn normalize(hit: &RawHit, fields: &FieldMap) -> Document {
    let id = mapped_text(hit, fields, LogicalField::Id).unwrap_or_default();
    let title = extract_title(hit, fields, &id);
    let content = extract_content(hit);
    let doc_type = extract_doc_type(hit, fields, &id);

    let status = if content.trim().is_empty() {
        DocumentStatus::ContentUnavailable
    } else {
        DocumentStatus::Ready
    };

    Document {
        title,
        content,
        author: mapped_text(hit, fields, LogicalField::Author)
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        category: mapped_text(hit, fields, LogicalField::ContentType)
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        doc_type,
        last_modified: extract_last_modified(hit, fields),
        size: extract_size(hit, fields),
        score: hit.score,
        status,
        metadata: hit.fields.clone(),
        id,
    }
}

/// Presentation-only relevance percentage in [0, 1].
///
/// Never used for ranking; ordering always follows the backend.
pub fn display_relevance(score: f64) -> f64 {
    (score.max(0.0) / RELEVANCE_SCALE).min(1.0)
}

/// The trimmed text of the mapped physical field, if non-empty.
fn mapped_text(hit: &RawHit, fields: &FieldMap, field: LogicalField) -> Option<String> {
    let physical = fields.get(field)?;
    let value = hit.get(physical)?;
    value_to_text(value)
}

/// Flatten a JSON value into trimmed non-empty text.
///
/// List values join with single spaces, matching how multi-valued
/// extraction fields are stored.
fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

/// First non-empty candidate content field, else the empty string.
///
/// The empty string is a meaningful result: downstream it selects the
/// content-unavailable fallback path.
fn extract_content(hit: &RawHit) -> String {
    CONTENT_FIELD_PRIORITY
        .iter()
        .filter_map(|candidate| hit.get_ignore_case(candidate))
        .find_map(value_to_text)
        .unwrap_or_default()
}

/// Title from the mapped title field, else derived from the id, else the
/// fixed placeholder.
fn extract_title(hit: &RawHit, fields: &FieldMap, id: &str) -> String {
    if let Some(title) = mapped_text(hit, fields, LogicalField::Title) {
        // An index title may itself be a raw filename; clean it the same
        // way as a path segment, keeping an already-clean title untouched.
        if let Some(cleaned) = clean_title_segment(&title) {
            return cleaned;
        }
    }

    derive_title_from_id(id).unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

/// Derive a readable title from an id's last path segment.
pub fn derive_title_from_id(id: &str) -> Option<String> {
    let segment = id
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()?;
    clean_title_segment(segment)
}

/// Turn a filename-ish segment into a readable title.
///
/// Percent-decodes, strips one known document extension, maps `_`/`-` to
/// spaces, splits camelCase at lower-to-upper transitions, collapses
/// whitespace and capitalizes each word. Idempotent on already-clean
/// titles.
fn clean_title_segment(segment: &str) -> Option<String> {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let stem = strip_document_extension(&decoded);

    let spaced: String = stem.replace(['_', '-'], " ");

    let mut split = String::with_capacity(spaced.len());
    let mut prev_lower = false;
    for ch in spaced.chars() {
        if prev_lower && ch.is_uppercase() {
            split.push(' ');
        }
        prev_lower = ch.is_lowercase();
        split.push(ch);
    }

    let title = split
        .split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ");

    (!title.is_empty()).then_some(title)
}

fn strip_document_extension(name: &str) -> &str {
    if let Some((stem, extension)) = name.rsplit_once('.') {
        if !stem.is_empty() && DOCUMENT_EXTENSIONS.contains(&extension.to_lowercase().as_str()) {
            return stem;
        }
    }
    name
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase type token from the extension field, else from the id's
/// filename extension, else the fixed default.
fn extract_doc_type(hit: &RawHit, fields: &FieldMap, id: &str) -> String {
    if let Some(extension) = mapped_text(hit, fields, LogicalField::Extension) {
        let cleaned = extension.trim_start_matches('.').to_uppercase();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    let decoded = percent_decode_str(id).decode_utf8_lossy().into_owned();
    let filename = decoded.rsplit(['/', '\\']).next().unwrap_or_default();
    match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
            extension.to_uppercase()
        }
        _ => DEFAULT_TYPE.to_string(),
    }
}

fn extract_last_modified(hit: &RawHit, fields: &FieldMap) -> Option<DateTime<Utc>> {
    let text = mapped_text(hit, fields, LogicalField::LastModified)?;
    DateTime::parse_from_rfc3339(&text)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

/// Human-readable size from the mapped size field.
///
/// A missing field renders as zero; a present but unparseable value
/// renders as "Unknown" rather than erroring.
fn extract_size(hit: &RawHit, fields: &FieldMap) -> String {
    let value = fields
        .get(LogicalField::Size)
        .and_then(|physical| hit.get(physical));

    match value {
        None | Some(Value::Null) => format_bytes(0),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(bytes) => format_bytes(bytes),
            None => "Unknown".to_string(),
        },
        Some(Value::String(s)) => match s.trim().parse::<u64>() {
            Ok(bytes) => format_bytes(bytes),
            Err(_) => "Unknown".to_string(),
        },
        Some(_) => "Unknown".to_string(),
    }
}

/// Format a byte count with binary (1024) units.
///
/// Two-decimal precision with trailing zeros trimmed, using the smallest
/// unit where the scaled value is at least 1. Zero renders as "0 Bytes"
/// exactly.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut scaled = bytes as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let mut rendered = format!("{:.2}", scaled);
    if rendered.contains('.') {
        rendered = rendered.trim_end_matches('0').trim_end_matches('.').to_string();
    }

    format!("{} {}", rendered, UNITS[unit])
}
