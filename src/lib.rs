//! Resilient client for a remote asynchronous job service.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller
//!     │ submit(job_type, payload, principal)          poll(job_id, timeout)
//!     ▼                                                     ▼
//!  ┌────────────────┐                              ┌────────────────┐
//!  │ JobDispatcher  │                              │   JobPoller    │
//!  └───────┬────────┘                              └───────┬────────┘
//!          └──────────────────┬────────────────────────────┘
//!                             ▼
//!                   ┌───────────────────┐
//!                   │  ResilientClient  │  bounded attempts, fixed delay
//!                   └─────────┬─────────┘
//!                             ▼
//!                   ┌───────────────────┐
//!                   │    RateLimiter    │  quota per rolling second, shared
//!                   └─────────┬─────────┘
//!                             ▼
//!                   ┌───────────────────┐
//!                   │   HttpTransport   │  one exchange, JSON in and out
//!                   └─────────┬─────────┘
//!                             ▼
//!                      remote job service
//! ```

// Core subsystems
pub mod client;
pub mod jobs;
pub mod transport;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod resilience;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientError, ResilientClient};
pub use config::ClientConfig;
pub use jobs::{Job, JobClient, JobError, Principal, TxStatus};
pub use resilience::RateLimiter;
