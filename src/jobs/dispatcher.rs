//! Job submission.

use serde_json::Value;

use crate::client::ResilientClient;
use crate::jobs::routes::JobRoutes;
use crate::jobs::types::{Job, JobResult, Principal};
use crate::observability::metrics;
use crate::transport::RequestSpec;

/// Creates jobs on the remote service.
#[derive(Debug, Clone)]
pub struct JobDispatcher {
    client: ResilientClient,
    routes: JobRoutes,
}

impl JobDispatcher {
    pub fn new(client: ResilientClient, routes: JobRoutes) -> Self {
        Self { client, routes }
    }

    /// Submit `payload` as a job of `job_type` on behalf of `principal`.
    ///
    /// The service normally answers with a pending job. Failures from the
    /// request client are returned unchanged; nothing is retried here.
    pub async fn submit(
        &self,
        job_type: &str,
        payload: Value,
        principal: &Principal,
    ) -> JobResult<Job> {
        let path = self.routes.create_path(job_type)?;
        let spec = RequestSpec::post(self.client.host(), path, payload)
            .with_headers(principal.auth_headers());

        let value = match self.client.request(spec).await {
            Ok(value) => value,
            Err(e) => {
                metrics::record_dispatch(job_type, "error");
                return Err(e.into());
            }
        };

        let job = Job::from_value(value).inspect_err(|e| {
            metrics::record_dispatch(job_type, "malformed");
            tracing::error!(job_type, error = %e, "Dispatch answered with something other than a job");
        })?;

        if job.is_pending() {
            tracing::info!(job_id = %job.job_id(), job_type, principal = %principal.id, "Job dispatched");
        } else {
            tracing::info!(
                job_id = %job.job_id(),
                job_type,
                principal = %principal.id,
                status = %job.status(),
                "Job finished synchronously"
            );
        }
        metrics::record_dispatch(job_type, "ok");
        Ok(job)
    }
}
