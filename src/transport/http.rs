//! HTTP transport backed by reqwest.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::{ApiConfig, TimeoutConfig};
use crate::transport::types::{BodyClass, RequestSpec, SendError};
use crate::transport::Transport;

/// Longest body excerpt written to the log on a parse failure.
const BODY_EXCERPT_CHARS: usize = 256;

/// Performs one HTTP exchange per [`Transport::send`] call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    scheme: String,
    port: u16,
}

impl HttpTransport {
    pub fn new(client: Client, scheme: impl Into<String>, port: u16) -> Self {
        Self {
            client,
            scheme: scheme.into(),
            port,
        }
    }

    /// Build a transport with connect and request timeouts from configuration.
    pub fn from_config(api: &ApiConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs));
        if api.no_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self::new(builder.build()?, api.scheme.clone(), api.port))
    }

    fn url(&self, spec: &RequestSpec) -> Result<Url, SendError> {
        let separator = if spec.path.starts_with('/') { "" } else { "/" };
        let raw = format!(
            "{}://{}:{}{}{}",
            self.scheme, spec.host, self.port, separator, spec.path
        );
        Url::parse(&raw).map_err(|e| SendError::transport(format!("invalid url '{}': {}", raw, e)))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, spec: &RequestSpec) -> Result<Value, SendError> {
        let url = self.url(spec)?;
        let body = spec.encoded_body();
        let headers = header_map(spec.effective_headers(body.as_ref().map(String::len)))?;

        let mut request = self
            .client
            .request(spec.method.into(), url)
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            let reason = error_chain(&e);
            tracing::warn!(
                method = %spec.method,
                host = %spec.host,
                path = %spec.path,
                error = %reason,
                "Request failed before a response was received"
            );
            SendError::Transport { reason }
        })?;

        let status = response.status().as_u16();
        // Accumulate the whole body before parsing.
        let text = response.text().await.map_err(|e| {
            let reason = error_chain(&e);
            tracing::warn!(path = %spec.path, status, error = %reason, "Failed to read response body");
            SendError::Transport { reason }
        })?;

        tracing::debug!(method = %spec.method, path = %spec.path, status, "Response received");
        parse_body(status, &text, spec)
    }
}

/// Parse a complete response body, logging diagnostics when it is not JSON.
pub(crate) fn parse_body(status: u16, body: &str, spec: &RequestSpec) -> Result<Value, SendError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(value),
        Err(e) => {
            let class = BodyClass::classify(body);
            match class {
                BodyClass::ServerError => tracing::error!(
                    method = %spec.method,
                    path = %spec.path,
                    status,
                    "Remote answered with a 500 error page"
                ),
                _ => tracing::error!(
                    method = %spec.method,
                    path = %spec.path,
                    status,
                    class = %class,
                    body = %excerpt(body),
                    "Response body is not JSON"
                ),
            }
            Err(SendError::Parse {
                status,
                class,
                reason: e.to_string(),
            })
        }
    }
}

fn header_map(headers: Vec<(String, String)>) -> Result<HeaderMap, SendError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SendError::transport(format!("invalid header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| SendError::transport(format!("invalid value for header '{}': {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn excerpt(body: &str) -> String {
    let mut out: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    if body.chars().count() > BODY_EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
