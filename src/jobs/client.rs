//! Dispatch and polling behind one handle.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::client::ResilientClient;
use crate::config::{ClientConfig, PollingConfig};
use crate::jobs::dispatcher::JobDispatcher;
use crate::jobs::poller::JobPoller;
use crate::jobs::routes::JobRoutes;
use crate::jobs::types::{Job, JobResult, Principal};
use crate::resilience::RateLimiter;

/// Submits jobs and waits for them, sharing one request client.
#[derive(Debug, Clone)]
pub struct JobClient {
    dispatcher: JobDispatcher,
    poller: JobPoller,
    default_timeout: Duration,
}

impl JobClient {
    pub fn new(client: ResilientClient, routes: JobRoutes, poll_interval: Duration) -> Self {
        Self {
            dispatcher: JobDispatcher::new(client.clone(), routes.clone()),
            poller: JobPoller::new(client, routes, poll_interval),
            default_timeout: PollingConfig::default().default_timeout(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        Self::from_config_with_limiter(config, limiter)
    }

    /// Build from configuration, sharing `limiter` with other clients.
    pub fn from_config_with_limiter(
        config: &ClientConfig,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        let client = ResilientClient::from_config_with_limiter(config, limiter)?;
        let mut jobs = Self::new(client, JobRoutes::from_config(&config.api), config.polling.interval());
        jobs.default_timeout = config.polling.default_timeout();
        Ok(jobs)
    }

    pub fn dispatcher(&self) -> &JobDispatcher {
        &self.dispatcher
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    /// Timeout applied when a caller has none of its own.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub async fn submit(&self, job_type: &str, payload: Value, principal: &Principal) -> JobResult<Job> {
        self.dispatcher.submit(job_type, payload, principal).await
    }

    pub async fn fetch(&self, job_id: &str, principal: &Principal) -> JobResult<Job> {
        self.poller.fetch_as(job_id, principal).await
    }

    pub async fn poll(&self, job_id: &str, timeout: Duration, principal: &Principal) -> JobResult<Job> {
        self.poller.poll_as(job_id, timeout, principal).await
    }

    /// Submit a job, then poll it to a terminal state.
    ///
    /// The timeout covers polling only; a job the service finishes during
    /// submission is returned without polling.
    pub async fn submit_and_wait(
        &self,
        job_type: &str,
        payload: Value,
        principal: &Principal,
        timeout: Duration,
    ) -> JobResult<Job> {
        let job = self.submit(job_type, payload, principal).await?;
        if job.is_terminal() {
            return Ok(job);
        }
        self.poll(job.job_id(), timeout, principal).await
    }
}
