//! Request description and attempt-level errors.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Marker the job service's front end emits on its HTML 500 page.
pub const SERVER_ERROR_MARKER: &str = "500 Server Error";

/// HTTP methods the job API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// One outbound call, fully described. Retries resend it unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub host: String,
    pub path: String,
    pub body: Option<Value>,
    pub headers: BTreeMap<String, String>,
}

impl RequestSpec {
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(Method::Get, host, path)
    }

    pub fn post(host: impl Into<String>, path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, host, path).with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether a header is set, ignoring case.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// The serialized JSON body, if any.
    pub fn encoded_body(&self) -> Option<String> {
        self.body.as_ref().map(Value::to_string)
    }

    /// Headers as sent on the wire.
    ///
    /// Content headers for the body come first; caller headers are merged on
    /// top and replace any entry with the same name, ignoring case.
    pub fn effective_headers(&self, body_len: Option<usize>) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::with_capacity(self.headers.len() + 2);
        if let Some(len) = body_len {
            merged.push(("Content-Type".to_string(), "application/json".to_string()));
            merged.push(("Content-Length".to_string(), len.to_string()));
        }

        for (name, value) in &self.headers {
            merged.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            merged.push((name.clone(), value.clone()));
        }
        merged
    }
}

/// Diagnostic class of a response body that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyClass {
    /// The service's generic 500 error page.
    ServerError,
    /// Nothing but whitespace.
    Empty,
    /// Anything else that is not JSON.
    NotStructured,
}

impl BodyClass {
    pub fn classify(body: &str) -> Self {
        if body.contains(SERVER_ERROR_MARKER) {
            BodyClass::ServerError
        } else if body.trim().is_empty() {
            BodyClass::Empty
        } else {
            BodyClass::NotStructured
        }
    }
}

impl fmt::Display for BodyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BodyClass::ServerError => "server error page",
            BodyClass::Empty => "empty body",
            BodyClass::NotStructured => "not json",
        })
    }
}

/// Failure of a single transport attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    /// No response was produced (connect failure, timeout, broken body, bad request).
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// A response arrived but its body is not JSON.
    #[error("parse error (HTTP {status}, {class}): {reason}")]
    Parse {
        status: u16,
        class: BodyClass,
        reason: String,
    },
}

impl SendError {
    pub fn transport(reason: impl Into<String>) -> Self {
        SendError::Transport {
            reason: reason.into(),
        }
    }

    /// True if the remote produced a response, even an unusable one.
    pub fn response_produced(&self) -> bool {
        matches!(self, SendError::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_sets_content_headers() {
        let spec = RequestSpec::post("h", "/job", json!({"type": "X", "value": 1}));
        let body = spec.encoded_body().unwrap();
        let headers = spec.effective_headers(Some(body.len()));

        assert_eq!(
            headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Content-Length".to_string(), body.len().to_string()),
            ]
        );
    }

    #[test]
    fn test_caller_headers_win_ignoring_case() {
        let spec = RequestSpec::post("h", "/job", json!({}))
            .with_header("content-type", "application/vnd.jobs+json")
            .with_header("Authorization", "Bearer abc");
        let headers = spec.effective_headers(Some(2));

        assert_eq!(headers.len(), 3);
        assert!(headers.contains(&("Content-Length".to_string(), "2".to_string())));
        assert!(headers.contains(&(
            "content-type".to_string(),
            "application/vnd.jobs+json".to_string()
        )));
        assert!(!headers.iter().any(|(k, _)| k == "Content-Type"));
    }

    #[test]
    fn test_no_body_no_content_headers() {
        let spec = RequestSpec::get("h", "/job/1").with_header("Authorization", "Bearer abc");
        assert_eq!(spec.encoded_body(), None);
        assert_eq!(
            spec.effective_headers(None),
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
    }

    #[test]
    fn test_classify_bodies() {
        assert_eq!(
            BodyClass::classify("<h1>500 Server Error</h1> Internal"),
            BodyClass::ServerError
        );
        assert_eq!(BodyClass::classify("  \n"), BodyClass::Empty);
        assert_eq!(BodyClass::classify("Bad Gateway"), BodyClass::NotStructured);
    }

    #[test]
    fn test_response_produced() {
        assert!(!SendError::transport("connection refused").response_produced());
        let parse = SendError::Parse {
            status: 500,
            class: BodyClass::ServerError,
            reason: "expected value".into(),
        };
        assert!(parse.response_produced());
        assert!(parse.to_string().contains("server error page"));
    }
}
