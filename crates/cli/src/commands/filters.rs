//! Filters command handler.
//!
//! Lists the filter values available in the index, grouped by concept.

use crate::commands::build_pipeline;
use clap::Args;
use docquery_core::{AppConfig, ServiceResult};
use docquery_search::FacetValue;

/// List the filter values available in the index
#[derive(Args, Debug)]
pub struct FiltersCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl FiltersCommand {
    /// Execute the filters command.
    pub async fn execute(&self, config: &AppConfig) -> ServiceResult<()> {
        let pipeline = build_pipeline(config);
        let options = pipeline.available_filters().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&options)?);
            return Ok(());
        }

        print_group("Authors", &options.authors);
        print_group("Categories", &options.categories);
        print_group("Document types", &options.document_types);

        Ok(())
    }
}

fn print_group(label: &str, values: &[FacetValue]) {
    println!("{}:", label);
    if values.is_empty() {
        println!("  (none available)");
    }
    for facet in values {
        println!("  {} ({})", facet.value, facet.count);
    }
    println!();
}
