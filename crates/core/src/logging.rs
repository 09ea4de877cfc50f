//! Logging infrastructure for the docquery pipeline.
//!
//! Initializes the tracing subscriber. All logs go to stderr so stdout
//! stays clean for data output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ServiceError, ServiceResult};

/// Initialize the tracing subscriber with stderr output.
///
/// Filtering follows `log_level` when given, else `RUST_LOG`, else "info".
/// ANSI colors are suppressed when `no_color` is set or the `NO_COLOR`
/// environment variable is present.
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> ServiceResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = EnvFilter::try_new(filter_str)
        .map_err(|e| ServiceError::Config(format!("Invalid log filter: {}", e)))?;

    let ansi = !no_color && std::env::var("NO_COLOR").is_err();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(ansi);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ServiceError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_rejects_bad_filter() {
        let result = init_logging(Some("not==a==filter"), true);
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
