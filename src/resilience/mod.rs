//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request:
//!     → rate_limit.rs (wait for a token in the rolling one-second window)
//!     → transport attempt
//!     → On failure: retries.rs (attempts left? wait the fixed delay, try again)
//! ```
//!
//! # Design Decisions
//! - The limiter is constructed explicitly and shared via Arc, never global
//! - Every attempt, retries included, takes its own rate token
//! - Waiting suspends the task, it never blocks the runtime

pub mod rate_limit;
pub mod retries;

pub use rate_limit::RateLimiter;
pub use retries::RetryPolicy;
