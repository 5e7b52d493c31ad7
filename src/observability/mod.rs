//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver and HTTP layer produce:
//!     → logging.rs (structured log events: requested, served alias, rejected)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log output (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID attached by the HTTP layer
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
