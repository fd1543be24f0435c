//! Errors raised by the response hardening pipeline.
//!
//! Only [`HardeningError::MissingHeaderTarget`] is fatal for a request. The
//! other variants are recovered inside the middleware and never reach the
//! client.

use std::io;

/// Failure modes of header injection and audit logging.
#[derive(Debug, thiserror::Error)]
pub enum HardeningError {
    /// Hardening ran without an active request (startup probes, synthetic
    /// responses). Recovered by skipping the audit record.
    #[error("no request context available")]
    RequestContextUnavailable,

    /// The audit sink rejected a record. Recovered by dropping the record.
    #[error("audit sink write failed: {0}")]
    LogSinkFailure(#[from] io::Error),

    /// The response under construction has no header collection, so the
    /// header policy cannot be honored.
    #[error("response has no header collection to harden")]
    MissingHeaderTarget,
}

impl HardeningError {
    /// Whether the middleware may swallow this error and still serve the
    /// response.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingHeaderTarget)
    }
}
