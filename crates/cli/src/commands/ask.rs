//! Ask command handler.
//!
//! Runs one query through the full pipeline and prints the answer with its
//! citations and confidence.

use crate::commands::build_pipeline;
use chrono::NaiveDate;
use clap::Args;
use docquery_core::{AppConfig, ServiceResult};
use docquery_rag::{QueryOptions, RagResult};
use docquery_search::FilterCriteria;

/// Ask a question against the document index
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask ("*" retrieves without a query)
    pub query: String,

    /// Restrict to documents by this author (repeatable)
    #[arg(long = "author")]
    pub authors: Vec<String>,

    /// Restrict to this content category (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Restrict to this document-type extension (repeatable)
    #[arg(long = "doc-type")]
    pub extensions: Vec<String>,

    /// Only documents modified on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Only documents modified on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Restrict to this document id (repeatable)
    #[arg(long = "document-id")]
    pub document_ids: Vec<String>,

    /// Sampling temperature (0.0-1.0)
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Maximum tokens in the response
    #[arg(long, default_value_t = 2000)]
    pub max_tokens: u32,

    /// How many documents to retrieve
    #[arg(long, default_value_t = 10)]
    pub top: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> ServiceResult<()> {
        tracing::debug!("Ask command options: {:?}", self);

        let mut criteria = FilterCriteria::new()
            .with_authors(self.authors.clone())
            .with_categories(self.categories.clone())
            .with_extensions(self.extensions.clone())
            .with_document_ids(self.document_ids.clone());
        if self.from.is_some() || self.to.is_some() {
            criteria = criteria.with_date_range(self.from, self.to);
        }

        let options = QueryOptions::default()
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_top_documents(self.top);

        let pipeline = build_pipeline(config);
        let result = pipeline.process_query(&self.query, &criteria, &options).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }

        Ok(())
    }
}

fn print_result(result: &RagResult) {
    println!("{}", result.response);

    if !result.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in result.sources.iter().enumerate() {
            println!(
                "  {}. {} by {} [{}] ({:.0}% relevance)",
                i + 1,
                source.name,
                source.author,
                source.doc_type,
                source.display_relevance * 100.0
            );
        }
    }

    println!();
    println!(
        "Confidence: {:.2} | Tokens: {} | Model: {} | {:.2}s",
        result.confidence, result.tokens, result.model, result.processing_time
    );
}
