//! Generation context assembly.
//!
//! Builds the system prompt from the retrieved documents, choosing between
//! a rich-content template and a content-unavailable fallback. The branch
//! selection is the correctness-critical policy here: the assembler must
//! never claim content-grounded answers when no content was retrieved.

use docquery_core::{ServiceError, ServiceResult};
use docquery_search::Document;
use handlebars::Handlebars;
use serde_json::json;

/// Minimum trimmed content length for a document to count as usable.
pub const USABLE_CONTENT_THRESHOLD: usize = 50;

/// Character budget for one document's content excerpt.
const EXCERPT_BUDGET: usize = 1000;

/// Delimiter between document blocks.
const BLOCK_DELIMITER: &str = "\n\n---\n\n";

/// System prompt when at least one document has usable content.
const ANALYTICAL_TEMPLATE: &str = "\
You are an analytical assistant for a document collection. Analyze the \
provided documents and answer the user's question comprehensively.

Guidelines:
- Use specific information from the documents
- Cite documents by index when referencing information (e.g., \"According to Document 1...\")
- If information is incomplete, mention what additional details would be helpful
- Structure your response clearly with headings when appropriate
- Focus on actionable insights and practical implications

Available Documents:
{{context}}";

/// System prompt when no retrieved document has usable content.
const GUIDANCE_TEMPLATE: &str = "\
You are an assistant for a document collection. Text content could not be \
retrieved for the matching documents, so you must not invent answers from \
content you cannot see.

Guidelines:
- Describe what each document likely contains, based on its title, type and metadata
- Explain how the user can access the documents directly
- Be explicit that your answer is based on document metadata only

Matching Documents:
{{context}}";

/// An assembled generation context.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// The rendered system prompt, context included
    pub system_prompt: String,

    /// Whether the rich-content branch was taken
    pub used_content: bool,

    /// How many documents the context describes
    pub document_count: usize,
}

/// Whether a document's content clears the usefulness threshold.
pub fn has_usable_content(document: &Document) -> bool {
    document.content.trim().chars().count() > USABLE_CONTENT_THRESHOLD
}

/// Assemble the generation context from the ranked document list.
///
/// With at least one usable document the context holds only the usable
/// subset, rendered with content excerpts. With none it holds every
/// retrieved document, metadata only, under the fallback template.
pub fn assemble_context(documents: &[Document]) -> ServiceResult<AssembledContext> {
    let usable: Vec<&Document> = documents.iter().filter(|d| has_usable_content(d)).collect();

    tracing::debug!(
        retrieved = documents.len(),
        usable = usable.len(),
        "Assembling generation context"
    );

    let (template, blocks, used_content) = if usable.is_empty() {
        let blocks: Vec<String> = documents
            .iter()
            .enumerate()
            .map(|(i, d)| metadata_block(i + 1, d))
            .collect();
        (GUIDANCE_TEMPLATE, blocks, false)
    } else {
        let blocks: Vec<String> = usable
            .iter()
            .enumerate()
            .map(|(i, d)| content_block(i + 1, d))
            .collect();
        (ANALYTICAL_TEMPLATE, blocks, true)
    };

    let document_count = blocks.len();
    let context = blocks.join(BLOCK_DELIMITER);
    let system_prompt = render_template(template, &context)?;

    Ok(AssembledContext {
        system_prompt,
        used_content,
        document_count,
    })
}

/// Render a system-prompt template with the document context.
fn render_template(template: &str, context: &str) -> ServiceResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output; no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("system", template)
        .map_err(|e| ServiceError::Pipeline(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("system", &json!({ "context": context }))
        .map_err(|e| ServiceError::Pipeline(format!("Failed to render template: {}", e)))
}

/// A labeled block for a document with usable content.
fn content_block(index: usize, document: &Document) -> String {
    format!(
        "[Document {}: \"{}\"]\nAuthor: {}\nType: {}\nCategory: {}\nContent: {}",
        index,
        document.title,
        document.author,
        document.doc_type,
        document.category,
        excerpt(&document.content),
    )
}

/// A metadata-only block for the fallback path.
fn metadata_block(index: usize, document: &Document) -> String {
    format!(
        "[Document {}: \"{}\"]\nAuthor: {}\nType: {}\nCategory: {}\nNote: Text content not accessible for this {} file.",
        index,
        document.title,
        document.author,
        document.doc_type,
        document.category,
        document.doc_type,
    )
}

/// Bound a content excerpt to the character budget, marking truncation.
fn excerpt(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= EXCERPT_BUDGET {
        return trimmed.to_string();
    }

    let bounded: String = trimmed.chars().take(EXCERPT_BUDGET).collect();
    format!("{}...", bounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docquery_search::DocumentStatus;

    fn document(title: &str, content: &str) -> Document {
        Document {
            id: format!("docs/{}.pdf", title.to_lowercase()),
            title: title.to_string(),
            content: content.to_string(),
            author: "Jordan".into(),
            category: "Document".into(),
            doc_type: "PDF".into(),
            last_modified: None,
            size: "1.5 KB".into(),
            score: 5.0,
            status: if content.trim().is_empty() {
                DocumentStatus::ContentUnavailable
            } else {
                DocumentStatus::Ready
            },
            metadata: serde_json::Map::new(),
        }
    }

    fn long_content() -> String {
        "Quarterly exposure assessment across markets. ".repeat(4)
    }

    #[test]
    fn test_single_usable_document_selects_rich_branch_with_only_it() {
        let documents = vec![
            document("Empty One", ""),
            document("Rich", &long_content()),
            document("Empty Two", "short"),
        ];

        let context = assemble_context(&documents).unwrap();
        assert!(context.used_content);
        assert_eq!(context.document_count, 1);
        assert!(context.system_prompt.contains("[Document 1: \"Rich\"]"));
        assert!(!context.system_prompt.contains("Empty One"));
        assert!(!context.system_prompt.contains("Empty Two"));
        assert!(context.system_prompt.contains("analytical assistant"));
    }

    #[test]
    fn test_no_usable_content_selects_fallback_with_all_documents() {
        let documents = vec![document("First", ""), document("Second", "tiny")];

        let context = assemble_context(&documents).unwrap();
        assert!(!context.used_content);
        assert_eq!(context.document_count, 2);
        assert!(context.system_prompt.contains("[Document 1: \"First\"]"));
        assert!(context.system_prompt.contains("[Document 2: \"Second\"]"));
        assert!(context.system_prompt.contains("metadata only"));
        assert!(context
            .system_prompt
            .contains("Text content not accessible for this PDF file."));
    }

    #[test]
    fn test_threshold_is_strictly_above_fifty_chars() {
        let at_threshold = "x".repeat(USABLE_CONTENT_THRESHOLD);
        let above_threshold = "x".repeat(USABLE_CONTENT_THRESHOLD + 1);

        assert!(!has_usable_content(&document("A", &at_threshold)));
        assert!(has_usable_content(&document("B", &above_threshold)));
        // Padding whitespace does not clear the threshold.
        let padded = format!("  {}  \n", at_threshold);
        assert!(!has_usable_content(&document("C", &padded)));
    }

    #[test]
    fn test_long_content_truncates_with_ellipsis() {
        let content = "y".repeat(EXCERPT_BUDGET + 200);
        let documents = vec![document("Long", &content)];

        let context = assemble_context(&documents).unwrap();
        assert!(context.system_prompt.contains(&format!(
            "{}...",
            "y".repeat(EXCERPT_BUDGET)
        )));
        assert!(!context.system_prompt.contains(&"y".repeat(EXCERPT_BUDGET + 1)));
    }

    #[test]
    fn test_blocks_are_delimited() {
        let documents = vec![
            document("One", &long_content()),
            document("Two", &long_content()),
        ];

        let context = assemble_context(&documents).unwrap();
        assert!(context.system_prompt.contains("\n\n---\n\n"));
        assert!(context.system_prompt.contains("[Document 2: \"Two\"]"));
    }
}
