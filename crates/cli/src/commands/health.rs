//! Health command handler.
//!
//! Probes both backends independently and reports per-backend health.

use crate::commands::build_pipeline;
use clap::Args;
use docquery_core::{AppConfig, ServiceResult};

/// Probe connectivity to both backends
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    /// Execute the health command.
    pub async fn execute(&self, config: &AppConfig) -> ServiceResult<()> {
        let pipeline = build_pipeline(config);
        let status = pipeline.test_connection().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&status)?);
        } else {
            println!(
                "search: {}",
                if status.search_healthy { "healthy" } else { "unhealthy" }
            );
            println!(
                "generation: {}",
                if status.generation_healthy { "healthy" } else { "unhealthy" }
            );
            for error in &status.errors {
                println!("  {}", error);
            }
        }

        if !status.search_healthy || !status.generation_healthy {
            std::process::exit(1);
        }

        Ok(())
    }
}
