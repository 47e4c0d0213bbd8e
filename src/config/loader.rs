//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Replace the API host and validate the result again.
pub fn override_host(mut config: ClientConfig, host: &str) -> Result<ClientConfig, ConfigError> {
    config.api.host = host.to_string();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [api]
            host = "jobs.example.com"
            base_path = "/v1"

            [rate_limit]
            requests_per_second = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_path, "/v1");
        assert_eq!(config.rate_limit.requests_per_second, 10);
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config(
            r#"
            [rate_limit]
            requests_per_second = 0

            [retries]
            max_attempts = 0
            "#,
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("rate_limit.requests_per_second"));
        assert!(msg.contains(", retries.max_attempts"));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = parse_config("[api\nhost = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/job-relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_host_override_is_validated() {
        let config = override_host(ClientConfig::default(), "jobs.internal").unwrap();
        assert_eq!(config.api.host, "jobs.internal");

        for bad in ["https://jobs.internal", "jobs.internal:8443", ""] {
            let err = override_host(ClientConfig::default(), bad).unwrap_err();
            match err {
                ConfigError::Validation(errors) => {
                    assert!(errors.iter().any(|e| e.field == "api.host"), "{:?} accepted", bad)
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }
}
