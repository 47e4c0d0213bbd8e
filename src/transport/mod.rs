//! Transport subsystem.
//!
//! # Responsibilities
//! - Perform exactly one request/response exchange per call
//! - Add JSON content headers for bodies, then merge caller headers on top
//! - Read the whole body and parse it as JSON
//! - Report "no response" and "unusable response" as distinct errors
//!
//! # Design Decisions
//! - No retries or rate limiting here; the client layer owns both
//! - HTTP status is logged, not interpreted: the job API answers errors as JSON too
//! - `Transport` is a trait so the retry layer can be exercised without a network

pub mod http;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;
pub use types::{BodyClass, Method, RequestSpec, SendError};

/// A single request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `spec` once and return the parsed JSON body.
    async fn send(&self, spec: &RequestSpec) -> Result<Value, SendError>;
}
