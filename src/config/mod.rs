//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → used once to build the rate limiter, transport and job clients
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, override_host, parse_config, ConfigError};
pub use schema::{
    ApiConfig, ClientConfig, ObservabilityConfig, PollingConfig, RateLimitConfig, RetryConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
