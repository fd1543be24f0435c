//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Hardening middleware produces:
//!     → audit.rs (flagged request/response pairs)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → logging.rs console layer (stdout, pretty or JSON)
//!     → logging.rs audit layer → rotation.rs (size-capped security log)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing for every subsystem
//! - The audit logger is an explicit value, not global state
//! - Metrics are cheap (atomic increments)

pub mod audit;
pub mod logging;
pub mod metrics;
pub mod rotation;

pub use audit::{AuditLogger, AuditReason, AuditRecord, AuditSink, TracingAuditSink};
pub use rotation::RotatingFile;
