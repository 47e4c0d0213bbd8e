//! Job status polling.
//!
//! # State Machine
//! ```text
//! Pending ──fetch──▶ Pending   (wait interval, fetch again)
//!    │
//!    ├──fetch──▶ Complete      (terminal, return job)
//!    ├──fetch──▶ Error         (terminal, return job)
//!    └──deadline──▶ PollTimeout (last observed status attached)
//! ```
//!
//! The deadline covers the whole call, fetches and waits alike, and is
//! measured from the moment `poll` starts.

use std::time::Duration;

use tokio::time::{sleep, timeout, Instant};

use crate::client::ResilientClient;
use crate::jobs::routes::JobRoutes;
use crate::jobs::types::{Job, JobError, JobResult, Principal, TxStatus};
use crate::observability::metrics;
use crate::transport::RequestSpec;

/// Observes jobs until they finish. Never changes remote state.
#[derive(Debug, Clone)]
pub struct JobPoller {
    client: ResilientClient,
    routes: JobRoutes,
    interval: Duration,
    principal: Principal,
}

impl JobPoller {
    pub fn new(client: ResilientClient, routes: JobRoutes, interval: Duration) -> Self {
        Self {
            client,
            routes,
            interval,
            principal: Principal::anonymous(),
        }
    }

    /// Principal used by [`fetch`](Self::fetch) and [`poll`](Self::poll).
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = principal;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch the current state of a job once.
    pub async fn fetch(&self, job_id: &str) -> JobResult<Job> {
        self.fetch_as(job_id, &self.principal).await
    }

    pub async fn fetch_as(&self, job_id: &str, principal: &Principal) -> JobResult<Job> {
        let path = self.routes.fetch_path(job_id)?;
        self.fetch_path(&path, job_id, principal).await
    }

    /// Poll until the job is terminal or `timeout` elapses.
    pub async fn poll(&self, job_id: &str, timeout: Duration) -> JobResult<Job> {
        self.poll_as(job_id, timeout, &self.principal).await
    }

    pub async fn poll_as(
        &self,
        job_id: &str,
        deadline: Duration,
        principal: &Principal,
    ) -> JobResult<Job> {
        let path = self.routes.fetch_path(job_id)?;
        let start = Instant::now();
        let mut last_status = None;
        let mut fetches = 0;

        let outcome = timeout(
            deadline,
            self.poll_loop(&path, job_id, principal, &mut last_status, &mut fetches),
        )
        .await;

        match outcome {
            Ok(Ok(job)) => {
                tracing::info!(job_id, fetches, status = %job.status(), "Job reached terminal state");
                metrics::record_poll("terminal", fetches);
                Ok(job)
            }
            Ok(Err(e)) => {
                tracing::warn!(job_id, fetches, error = %e, "Polling aborted");
                metrics::record_poll("error", fetches);
                Err(e)
            }
            Err(_) => {
                let elapsed = start.elapsed();
                tracing::warn!(
                    job_id,
                    fetches,
                    elapsed_ms = elapsed.as_millis() as u64,
                    last_status = ?last_status,
                    "Job did not finish before the deadline"
                );
                metrics::record_poll("timeout", fetches);
                Err(JobError::PollTimeout {
                    job_id: job_id.to_string(),
                    last_status,
                    elapsed,
                })
            }
        }
    }

    async fn poll_loop(
        &self,
        path: &str,
        job_id: &str,
        principal: &Principal,
        last_status: &mut Option<TxStatus>,
        fetches: &mut u32,
    ) -> JobResult<Job> {
        loop {
            *fetches += 1;
            let job = self.fetch_path(path, job_id, principal).await?;
            *last_status = Some(job.status());

            if job.is_terminal() {
                return Ok(job);
            }

            tracing::debug!(job_id, fetches = *fetches, "Job still pending");
            sleep(self.interval).await;
        }
    }

    async fn fetch_path(&self, path: &str, job_id: &str, principal: &Principal) -> JobResult<Job> {
        let spec =
            RequestSpec::get(self.client.host(), path).with_headers(principal.auth_headers());
        let value = self.client.request(spec).await?;
        let job = Job::from_value(value)?;

        if job.job_id() != job_id {
            return Err(JobError::MalformedJob {
                reason: format!("asked for job {} but got {}", job_id, job.job_id()),
            });
        }
        Ok(job)
    }
}
