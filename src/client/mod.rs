//! Resilient request client.
//!
//! # Data Flow
//! ```text
//! request(spec)
//!     → attach x-request-id (once, shared by all attempts)
//!     → per attempt: RateLimiter::acquire → Transport::send
//!     → JSON value: done
//!     → error or null: log, wait the retry delay, resend unchanged
//!     → attempts exhausted: ClientError::Exhausted with the last cause
//! ```
//!
//! # Design Decisions
//! - Intermediate failures are logged and masked; only exhaustion surfaces
//! - No idempotency keys or deduplication: callers decide what is safe to repeat
//! - An issued attempt is never cancelled by this layer

pub mod resilient;
pub mod types;

pub use resilient::{ResilientClient, REQUEST_ID_HEADER};
pub use types::{AttemptFailure, ClientError, ClientResult};
