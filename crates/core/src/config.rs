//! Configuration management for the docquery pipeline.
//!
//! Configuration is an explicit value constructed once (environment
//! variables, an optional YAML file, CLI overrides) and passed by reference
//! to each component constructor. Nothing reads configuration mid-query:
//! missing required settings fail fast in [`AppConfig::validate`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ServiceError, ServiceResult};

/// Main application configuration.
///
/// Endpoint URLs, credentials and index/deployment identifiers are consumed
/// as opaque strings; the pipeline never interprets them beyond building
/// request URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Search backend endpoint URL
    pub search_endpoint: String,

    /// Search backend API key
    pub search_api_key: String,

    /// Name of the document index to query
    pub search_index: String,

    /// Search API version string appended to requests
    pub search_api_version: String,

    /// Generation backend endpoint URL
    pub generation_endpoint: String,

    /// Generation backend API key
    pub generation_api_key: String,

    /// Model deployment identifier on the generation backend
    pub generation_deployment: String,

    /// Generation API version string appended to requests
    pub generation_api_version: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// YAML configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    search: Option<SearchConfigSection>,
    generation: Option<GenerationConfigSection>,
    logging: Option<LoggingConfigSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchConfigSection {
    endpoint: Option<String>,
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
    index: Option<String>,
    #[serde(rename = "apiVersion")]
    api_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GenerationConfigSection {
    endpoint: Option<String>,
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
    deployment: Option<String>,
    #[serde(rename = "apiVersion")]
    api_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfigSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_endpoint: String::new(),
            search_api_key: String::new(),
            search_index: "documents".to_string(),
            search_api_version: "2024-07-01".to_string(),
            generation_endpoint: String::new(),
            generation_api_key: String::new(),
            generation_deployment: "gpt-4".to_string(),
            generation_api_version: "2024-02-15-preview".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional YAML file and the environment.
    ///
    /// Environment variables (these override the file):
    /// - `DOCQUERY_SEARCH_ENDPOINT`: search backend URL
    /// - `DOCQUERY_SEARCH_API_KEY`: search backend API key
    /// - `DOCQUERY_SEARCH_INDEX`: index name (default "documents")
    /// - `DOCQUERY_SEARCH_API_VERSION`: search API version
    /// - `DOCQUERY_GENERATION_ENDPOINT`: generation backend URL
    /// - `DOCQUERY_GENERATION_API_KEY`: generation backend API key
    /// - `DOCQUERY_GENERATION_DEPLOYMENT`: model deployment (default "gpt-4")
    /// - `DOCQUERY_GENERATION_API_VERSION`: generation API version
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    ///
    /// The config file is `config_file` if given, else the path in
    /// `DOCQUERY_CONFIG`, else `docquery.yaml` in the current directory
    /// when present.
    pub fn load(config_file: Option<&Path>) -> ServiceResult<Self> {
        let mut config = Self::default();

        let config_path: Option<PathBuf> = match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => match std::env::var("DOCQUERY_CONFIG") {
                Ok(path) => Some(PathBuf::from(path)),
                Err(_) => {
                    let default_path = PathBuf::from("docquery.yaml");
                    default_path.exists().then_some(default_path)
                }
            },
        };

        if let Some(ref path) = config_path {
            config.merge_yaml(path)?;
        }

        // Environment variables override the file
        let env_overrides = [
            ("DOCQUERY_SEARCH_ENDPOINT", &mut config.search_endpoint),
            ("DOCQUERY_SEARCH_API_KEY", &mut config.search_api_key),
            ("DOCQUERY_SEARCH_INDEX", &mut config.search_index),
            ("DOCQUERY_SEARCH_API_VERSION", &mut config.search_api_version),
            (
                "DOCQUERY_GENERATION_ENDPOINT",
                &mut config.generation_endpoint,
            ),
            (
                "DOCQUERY_GENERATION_API_KEY",
                &mut config.generation_api_key,
            ),
            (
                "DOCQUERY_GENERATION_DEPLOYMENT",
                &mut config.generation_deployment,
            ),
            (
                "DOCQUERY_GENERATION_API_VERSION",
                &mut config.generation_api_version,
            ),
        ];
        for (var, slot) in env_overrides {
            if let Ok(value) = std::env::var(var) {
                *slot = value;
            }
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> ServiceResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            ServiceError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(search) = config_file.search {
            if let Some(endpoint) = search.endpoint {
                self.search_endpoint = endpoint;
            }
            if let Some(api_key) = search.api_key {
                self.search_api_key = api_key;
            }
            if let Some(index) = search.index {
                self.search_index = index;
            }
            if let Some(api_version) = search.api_version {
                self.search_api_version = api_version;
            }
        }

        if let Some(generation) = config_file.generation {
            if let Some(endpoint) = generation.endpoint {
                self.generation_endpoint = endpoint;
            }
            if let Some(api_key) = generation.api_key {
                self.generation_api_key = api_key;
            }
            if let Some(deployment) = generation.deployment {
                self.generation_deployment = deployment;
            }
            if let Some(api_version) = generation.api_version {
                self.generation_api_version = api_version;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides, giving flags precedence over environment and file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate that every required connection setting is present.
    ///
    /// Called at construction; a missing setting must never surface
    /// mid-query.
    pub fn validate(&self) -> ServiceResult<()> {
        let required = [
            ("DOCQUERY_SEARCH_ENDPOINT", &self.search_endpoint),
            ("DOCQUERY_SEARCH_API_KEY", &self.search_api_key),
            ("DOCQUERY_GENERATION_ENDPOINT", &self.generation_endpoint),
            ("DOCQUERY_GENERATION_API_KEY", &self.generation_api_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(ServiceError::Config(format!(
                "Incomplete backend configuration, missing: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
