//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (strip Server, inject hardening headers)
//!     → agents.rs (flag scanner user-agents for the audit log)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Policy values are fixed at startup, never computed per request
//! - Hardening never fails a request it can still serve

pub mod agents;
pub mod headers;

pub use agents::SuspiciousAgents;
pub use headers::{HeaderPolicy, HeaderTarget};
