//! Job API paths.
//!
//! Job types are chosen by the caller and must already be plain path
//! segments. Job ids are assigned by the service and are percent-encoded
//! into the fetch path as-is.

use url::Url;

use crate::config::ApiConfig;
use crate::jobs::types::JobError;

/// Builds the create and fetch paths under a base prefix.
///
/// - create: `POST {base}/{job_type}`
/// - fetch:  `GET {base}/job/{job_id}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRoutes {
    base_path: String,
}

impl JobRoutes {
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        Self {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(api.base_path.clone())
    }

    pub fn create_path(&self, job_type: &str) -> Result<String, JobError> {
        check_segment("job type", job_type)?;
        Ok(format!("{}/{}", self.base_path, job_type))
    }

    pub fn fetch_path(&self, job_id: &str) -> Result<String, JobError> {
        let encoded = encode_segment("job id", job_id)?;
        Ok(format!("{}/job/{}", self.base_path, encoded))
    }
}

impl Default for JobRoutes {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> JobError {
    JobError::InvalidInput {
        field,
        reason: reason.into(),
    }
}

fn check_not_empty(field: &'static str, value: &str) -> Result<(), JobError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    // Dot segments collapse during URL normalization.
    if value == "." || value == ".." {
        return Err(invalid(field, format!("'{}' is not a path segment", value)));
    }
    Ok(())
}

fn check_segment(field: &'static str, value: &str) -> Result<(), JobError> {
    check_not_empty(field, value)?;
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
    {
        return Err(JobError::InvalidInput {
            field,
            reason: format!("'{}' contains {:?}", value, c),
        });
    }
    Ok(())
}

/// Percent-encode `value` as a single path segment.
fn encode_segment(field: &'static str, value: &str) -> Result<String, JobError> {
    check_not_empty(field, value)?;

    let mut url = Url::parse("http://localhost/").map_err(|e| invalid(field, e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid(field, "cannot be encoded as a path segment"))?
        .clear()
        .push(value);
    Ok(url.path().trim_start_matches('/').to_string())
}
