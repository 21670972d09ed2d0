//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (budgets > 0, addresses parse)
//! - Check that provider URLs are absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: &AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

/// One semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_socket_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_socket_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let providers = &config.providers;
    check_url(&mut errors, "providers.brasilapi_url", &providers.brasilapi_url);
    check_url(&mut errors, "providers.viacep_url", &providers.viacep_url);
    check_url(&mut errors, "providers.quote_url", &providers.quote_url);
    check_url(&mut errors, "providers.server_url", &providers.server_url);
    if providers.quote_pair.trim().is_empty() {
        errors.push(ValidationError::new("providers.quote_pair", "must not be empty"));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.lookup_ms", timeouts.lookup_ms),
        ("timeouts.fetch_ms", timeouts.fetch_ms),
        ("timeouts.persist_ms", timeouts.persist_ms),
        ("timeouts.client_ms", timeouts.client_ms),
        ("timeouts.client_persist_ms", timeouts.client_persist_ms),
        ("timeouts.request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }
    let staged_ms = timeouts.fetch_ms.saturating_add(timeouts.persist_ms);
    if timeouts.request_secs.saturating_mul(1000) <= staged_ms {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!("must exceed fetch_ms + persist_ms ({}ms)", staged_ms),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ValidationError::new("storage.database_path", "must not be empty"));
    }
    if config.storage.output_path.trim().is_empty() {
        errors.push(ValidationError::new("storage.output_path", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not a socket address", value)));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.providers.viacep_url = "ftp://viacep.com.br/ws".into();
        config.timeouts.persist_ms = 0;
        config.storage.output_path = " ".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "providers.viacep_url",
                "timeouts.persist_ms",
                "storage.output_path",
            ]
        );
    }

    #[test]
    fn test_request_timeout_must_cover_stages() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 1;
        config.timeouts.fetch_ms = 995;
        config.timeouts.persist_ms = 10;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "timeouts.request_secs");
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());
        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
