//! Job model and error definitions.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::client::{AttemptFailure, ClientError};
use crate::transport::SendError;

/// Job status as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Complete,
    Error,
}

impl TxStatus {
    /// Complete and Error are final; no further change is observed after them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Complete => "complete",
            TxStatus::Error => "error",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote job as last observed.
///
/// `tx_result` is present exactly when the status is terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    job_id: String,
    tx_status: TxStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_result: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireJob {
    job_id: String,
    tx_status: TxStatus,
    #[serde(default)]
    tx_result: Option<Value>,
}

impl Job {
    pub fn pending(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            tx_status: TxStatus::Pending,
            tx_result: None,
        }
    }

    /// A finished job. `status` must be terminal.
    pub fn finished(job_id: impl Into<String>, status: TxStatus, result: Value) -> Result<Self, JobError> {
        if !status.is_terminal() {
            return Err(JobError::MalformedJob {
                reason: "a pending job cannot carry a txResult".to_string(),
            });
        }
        Ok(Self {
            job_id: job_id.into(),
            tx_status: status,
            tx_result: Some(result),
        })
    }

    /// Decode a job from the service's JSON representation.
    pub fn from_value(value: Value) -> Result<Self, JobError> {
        let wire: WireJob = serde_json::from_value(value).map_err(|e| JobError::MalformedJob {
            reason: e.to_string(),
        })?;

        if wire.job_id.is_empty() {
            return Err(JobError::MalformedJob {
                reason: "jobId is empty".to_string(),
            });
        }

        match (wire.tx_status, wire.tx_result) {
            (TxStatus::Pending, result) => {
                if result.is_some() {
                    tracing::warn!(job_id = %wire.job_id, "Ignoring txResult on pending job");
                }
                Ok(Self::pending(wire.job_id))
            }
            (status, Some(result)) => Self::finished(wire.job_id, status, result),
            (status, None) => Err(JobError::MalformedJob {
                reason: format!("job {} is {} but has no txResult", wire.job_id, status),
            }),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn status(&self) -> TxStatus {
        self.tx_status
    }

    pub fn result(&self) -> Option<&Value> {
        self.tx_result.as_ref()
    }

    pub fn into_result(self) -> Option<Value> {
        self.tx_result
    }

    pub fn is_pending(&self) -> bool {
        self.tx_status == TxStatus::Pending
    }

    pub fn is_terminal(&self) -> bool {
        self.tx_status.is_terminal()
    }
}

/// The identity a job is submitted or observed as.
///
/// The token is sent as a bearer credential and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    token: Option<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Headers carrying this principal's credential.
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        self.token
            .as_ref()
            .map(|t| vec![("Authorization".to_string(), format!("Bearer {}", t))])
            .unwrap_or_default()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Coarse failure category, for mapping onto external responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached or kept failing.
    ServiceUnavailable,
    /// The job did not finish in time.
    Timeout,
    /// The service answered, but not with a job.
    BadResponse,
    /// The caller passed something unusable.
    InvalidInput,
}

/// Errors from job dispatch and polling.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Request(#[from] ClientError),

    /// The job was still not terminal when the deadline passed.
    #[error("job {job_id} not finished after {}ms (last status: {})", .elapsed.as_millis(), display_status(.last_status))]
    PollTimeout {
        job_id: String,
        /// `None` if no fetch completed before the deadline.
        last_status: Option<TxStatus>,
        elapsed: Duration,
    },

    #[error("malformed job response: {reason}")]
    MalformedJob { reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

fn display_status(status: &Option<TxStatus>) -> &'static str {
    status.map(|s| s.as_str()).unwrap_or("none")
}

impl JobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Request(ClientError::Exhausted { last_cause, .. }) => match last_cause {
                AttemptFailure::Send(SendError::Transport { .. }) => ErrorKind::ServiceUnavailable,
                // A 500 page is the service being down, not a bad answer.
                AttemptFailure::Send(SendError::Parse { status, .. }) if *status >= 500 => {
                    ErrorKind::ServiceUnavailable
                }
                AttemptFailure::Send(SendError::Parse { .. }) | AttemptFailure::EmptyResult => {
                    ErrorKind::BadResponse
                }
            },
            JobError::PollTimeout { .. } => ErrorKind::Timeout,
            JobError::MalformedJob { .. } => ErrorKind::BadResponse,
            JobError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Last observed status, for a caller deciding whether to resume polling.
    pub fn last_status(&self) -> Option<TxStatus> {
        match self {
            JobError::PollTimeout { last_status, .. } => *last_status,
            _ => None,
        }
    }
}

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{BodyClass, Method};
    use serde_json::json;

    #[test]
    fn test_decode_pending_job() {
        let job = Job::from_value(json!({"jobId": "abc123", "txStatus": "pending"})).unwrap();
        assert_eq!(job.job_id(), "abc123");
        assert!(job.is_pending());
        assert_eq!(job.result(), None);
    }

    #[test]
    fn test_decode_complete_job() {
        let job = Job::from_value(json!({
            "jobId": "abc123",
            "txStatus": "complete",
            "txResult": {"ok": true}
        }))
        .unwrap();
        assert!(job.is_terminal());
        assert_eq!(job.status(), TxStatus::Complete);
        assert_eq!(job.into_result(), Some(json!({"ok": true})));
    }

    #[test]
    fn test_result_present_iff_terminal() {
        let job = Job::from_value(json!({
            "jobId": "a",
            "txStatus": "pending",
            "txResult": {"early": true}
        }))
        .unwrap();
        assert_eq!(job.result(), None);

        let err = Job::from_value(json!({"jobId": "a", "txStatus": "error"})).unwrap_err();
        assert!(matches!(err, JobError::MalformedJob { .. }));

        assert!(Job::finished("a", TxStatus::Pending, json!({})).is_err());
    }

    #[test]
    fn test_decode_rejects_non_jobs() {
        for value in [
            json!({"message": "job not found"}),
            json!({"jobId": "a", "txStatus": "running"}),
            json!({"jobId": "", "txStatus": "pending"}),
            json!([1, 2, 3]),
        ] {
            let err = Job::from_value(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadResponse);
        }
    }

    #[test]
    fn test_job_serializes_in_wire_format() {
        let job = Job::finished("abc123", TxStatus::Error, json!({"error": "reverted"})).unwrap();
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({"jobId": "abc123", "txStatus": "error", "txResult": {"error": "reverted"}})
        );
        assert_eq!(
            serde_json::to_value(Job::pending("x")).unwrap(),
            json!({"jobId": "x", "txStatus": "pending"})
        );
    }

    #[test]
    fn test_principal_headers_and_debug() {
        let principal = Principal::new("admin-1").with_token("s3cret");
        assert_eq!(
            principal.auth_headers(),
            vec![("Authorization".to_string(), "Bearer s3cret".to_string())]
        );
        assert!(!format!("{:?}", principal).contains("s3cret"));
        assert!(Principal::anonymous().auth_headers().is_empty());
    }

    #[test]
    fn test_error_kinds() {
        let exhausted = |cause: AttemptFailure| {
            JobError::from(ClientError::Exhausted {
                method: Method::Get,
                path: "/admin/job/a".into(),
                attempts: 2,
                last_cause: cause,
            })
        };

        assert_eq!(
            exhausted(SendError::transport("refused").into()).kind(),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(
            exhausted(
                SendError::Parse {
                    status: 500,
                    class: BodyClass::ServerError,
                    reason: String::new()
                }
                .into()
            )
            .kind(),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(exhausted(AttemptFailure::EmptyResult).kind(), ErrorKind::BadResponse);

        let timeout = JobError::PollTimeout {
            job_id: "a".into(),
            last_status: Some(TxStatus::Pending),
            elapsed: Duration::from_millis(60_000),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.last_status(), Some(TxStatus::Pending));
        assert_eq!(
            timeout.to_string(),
            "job a not finished after 60000ms (last status: pending)"
        );
    }
}
