//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (quota > 0, attempts > 0, interval > 0, timeouts > 0)
//! - Check the API location can form a URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
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

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let api = &config.api;
    if api.host.trim().is_empty() {
        errors.push(ValidationError::new("api.host", "must not be empty"));
    } else if api.host.contains('/') || (api.host.contains(':') && !api.host.starts_with('[')) {
        errors.push(ValidationError::new(
            "api.host",
            format!("'{}' must be a bare hostname", api.host),
        ));
    }
    if api.scheme != "https" && api.scheme != "http" {
        errors.push(ValidationError::new(
            "api.scheme",
            format!("'{}' is not one of https, http", api.scheme),
        ));
    }
    if api.port == 0 {
        errors.push(ValidationError::new("api.port", "must be non-zero"));
    }
    if !api.base_path.is_empty() && !api.base_path.starts_with('/') {
        errors.push(ValidationError::new(
            "api.base_path",
            format!("'{}' must start with '/'", api.base_path),
        ));
    }

    if config.rate_limit.requests_per_second == 0 {
        errors.push(ValidationError::new(
            "rate_limit.requests_per_second",
            "must be at least 1",
        ));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new(
            "retries.max_attempts",
            "must be at least 1",
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.connect_secs",
            "must be non-zero",
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be non-zero",
        ));
    }

    if config.polling.interval_ms == 0 {
        errors.push(ValidationError::new(
            "polling.interval_ms",
            "must be non-zero",
        ));
    }

    let obs = &config.observability;
    if obs.log_format != "pretty" && obs.log_format != "json" {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("'{}' is not one of pretty, json", obs.log_format),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
