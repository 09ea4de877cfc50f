//! Error types for the docquery pipeline.
//!
//! This module defines a unified error enum covering every failure class in
//! the pipeline: configuration, search backend, generation backend,
//! transport-level network failures, and orchestration invariants.

use thiserror::Error;

/// The backend service a failure originated from.
///
/// Carried on errors so callers can render a service-specific message
/// instead of a generic one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Search,
    Generation,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Service::Search => write!(f, "search"),
            Service::Generation => write!(f, "generation"),
        }
    }
}

/// Unified error type for the docquery pipeline.
///
/// Only configuration failures and backend-call failures are raised through
/// this type. Lower-level components (normalizer, facet aggregator, filter
/// builder) substitute defaults for missing or malformed optional fields and
/// never error.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or invalid connection settings. Fatal at construction,
    /// never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The search backend rejected or failed a query.
    #[error("Search backend error: {0}")]
    Search(String),

    /// The generation backend rejected or failed a request.
    #[error("Generation backend error: {0}")]
    Generation(String),

    /// Transport-level failure, distinguished from an error the backend
    /// itself returned.
    #[error("Network error reaching {service} backend: {message}")]
    Network { service: Service, message: String },

    /// An invariant violation inside orchestration, e.g. an unexpected
    /// empty response shape.
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// The backend this error is attributable to, if any.
    pub fn service(&self) -> Option<Service> {
        match self {
            ServiceError::Search(_) => Some(Service::Search),
            ServiceError::Generation(_) => Some(Service::Generation),
            ServiceError::Network { service, .. } => Some(*service),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ServiceError {
    fn from(err: serde_yaml::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with ServiceError.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_attribution() {
        assert_eq!(
            ServiceError::Search("down".into()).service(),
            Some(Service::Search)
        );
        assert_eq!(
            ServiceError::Generation("down".into()).service(),
            Some(Service::Generation)
        );
        assert_eq!(
            ServiceError::Network {
                service: Service::Search,
                message: "timeout".into()
            }
            .service(),
            Some(Service::Search)
        );
        assert_eq!(ServiceError::Config("missing".into()).service(), None);
        assert_eq!(ServiceError::Pipeline("bad shape".into()).service(), None);
    }

    #[test]
    fn test_network_error_display_names_service() {
        let err = ServiceError::Network {
            service: Service::Generation,
            message: "connection refused".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("generation"));
        assert!(rendered.contains("connection refused"));
    }
}
