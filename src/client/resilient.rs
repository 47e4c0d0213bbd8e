//! Rate-limited request client with bounded retries.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::client::types::{AttemptFailure, ClientError, ClientResult};
use crate::config::ClientConfig;
use crate::observability::metrics;
use crate::resilience::{RateLimiter, RetryPolicy};
use crate::transport::{HttpTransport, RequestSpec, Transport};

/// Correlation header shared by all attempts of one logical request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sole entry point for outbound calls to the job service.
///
/// Cloning is cheap; clones share the transport and the rate limiter.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    host: String,
}

impl ResilientClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: Arc<RateLimiter>,
        policy: RetryPolicy,
        host: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            limiter,
            policy,
            host: host.into(),
        }
    }

    /// Build an HTTP-backed client with its own rate limiter.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self::from_config_with_limiter(config, limiter)
    }

    /// Build an HTTP-backed client sharing an existing rate limiter.
    pub fn from_config_with_limiter(
        config: &ClientConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::from_config(&config.api, &config.timeouts)?;
        Ok(Self::new(
            Arc::new(transport),
            limiter,
            RetryPolicy::from_config(&config.retries),
            config.api.host.clone(),
        ))
    }

    /// Host used by [`get`](Self::get) and [`post`](Self::post).
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `path` on the configured host.
    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> ClientResult<Value> {
        let spec = RequestSpec::get(self.host.clone(), path).with_headers(headers.iter().copied());
        self.request(spec).await
    }

    /// POST `body` to `path` on the configured host.
    pub async fn post(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> ClientResult<Value> {
        let spec =
            RequestSpec::post(self.host.clone(), path, body).with_headers(headers.iter().copied());
        self.request(spec).await
    }

    /// Send `spec`, retrying failed attempts per the retry policy.
    ///
    /// A JSON `null` body counts as a failed attempt. Each attempt waits for a
    /// rate token first. Retries resend the same method, path, body and headers.
    pub async fn request(&self, spec: RequestSpec) -> ClientResult<Value> {
        let spec = if spec.has_header(REQUEST_ID_HEADER) {
            spec
        } else {
            spec.with_header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
        };
        let request_id = spec
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(REQUEST_ID_HEADER))
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        let span = tracing::debug_span!(
            "request",
            request_id = %request_id,
            method = %spec.method,
            path = %spec.path
        );
        self.run_attempts(&spec).instrument(span).await
    }

    async fn run_attempts(&self, spec: &RequestSpec) -> ClientResult<Value> {
        let method = spec.method.as_str();
        let mut attempt = 0;

        loop {
            attempt += 1;

            self.limiter.acquire().await;
            let failure = match self.transport.send(spec).await {
                Ok(Value::Null) => AttemptFailure::EmptyResult,
                Ok(value) => {
                    metrics::record_attempt(method, "success");
                    if attempt > 1 {
                        tracing::info!(attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => AttemptFailure::Send(e),
            };
            metrics::record_attempt(method, failure.outcome());

            if !self.policy.should_retry(attempt) {
                tracing::error!(attempts = attempt, error = %failure, "Request failed, no attempts left");
                metrics::record_exhausted(method);
                return Err(ClientError::Exhausted {
                    method: spec.method,
                    path: spec.path.clone(),
                    attempts: attempt,
                    last_cause: failure,
                });
            }

            let delay = self.policy.delay_before_retry();
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Attempt failed, retrying"
            );
            metrics::record_retry(method);
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("host", &self.host)
            .field("quota", &self.limiter.quota())
            .field("policy", &self.policy)
            .finish()
    }
}
