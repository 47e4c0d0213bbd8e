//! Remote job subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → dispatcher.rs (POST {base}/{job_type}) → Job { pending }
//!     → poller.rs (GET {base}/job/{id}, every interval) → Job { complete | error }
//!     both through client::ResilientClient (rate limit + retries)
//! ```
//!
//! # Design Decisions
//! - Job ids come from the service and are only ever echoed back
//! - Nothing is cached or stored; every fetch is a fresh observation
//! - A decoded Job carries a result exactly when its status is terminal

pub mod client;
pub mod dispatcher;
pub mod poller;
pub mod routes;
pub mod types;

pub use client::JobClient;
pub use dispatcher::JobDispatcher;
pub use poller::JobPoller;
pub use routes::JobRoutes;
pub use types::{ErrorKind, Job, JobError, JobResult, Principal, TxStatus};
