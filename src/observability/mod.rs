//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! limiter, transport, client, jobs produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Failures are logged where they happen, with the raw detail that the
//!   surfaced errors deliberately leave out
//! - A request ID is attached to every attempt of one logical request

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
