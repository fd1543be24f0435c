//! Security audit log.
//!
//! # Responsibilities
//! - Decide whether a request/response pair deserves an audit record
//! - Build the record from the captured request context
//! - Hand it to a sink at the configured level
//!
//! # Design Decisions
//! - The logger is constructed explicitly and passed to the middleware,
//!   so tests can swap the sink without touching global state
//! - One record per response, even when several reasons apply
//! - Sink failures are reported to the caller, which decides to swallow them

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use tracing::Level;

use crate::error::HardeningError;
use crate::http::context::{RemoteDisplay, RequestContext};
use crate::security::SuspiciousAgents;

/// Tracing target routed to the rotating audit file.
pub const AUDIT_TARGET: &str = "audit";

/// Why a record was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditReason {
    ErrorStatus,
    SuspiciousAgent,
}

impl AuditReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ErrorStatus => "error_status",
            Self::SuspiciousAgent => "suspicious_agent",
        }
    }
}

/// One flagged request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRecord {
    pub remote_addr: Option<SocketAddr>,
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub user_agent: Option<String>,
    pub reason: AuditReason,
}

impl AuditRecord {
    pub fn new(context: &RequestContext, status: StatusCode, reason: AuditReason) -> Self {
        Self {
            remote_addr: context.remote_addr,
            method: context.method.clone(),
            path: context.path.clone(),
            status,
            user_agent: context.user_agent.clone(),
            reason,
        }
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} \"{}\"",
            RemoteDisplay(&self.remote_addr),
            self.method,
            self.path,
            self.status.as_u16(),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }
}

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    fn emit(&self, level: Level, record: &AuditRecord) -> Result<(), HardeningError>;
}

/// Emits records as `tracing` events on [`AUDIT_TARGET`].
///
/// The subscriber installed by [`logging::init`](super::logging::init) sends
/// that target to the rotating file; write errors stay inside the subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, level: Level, record: &AuditRecord) -> Result<(), HardeningError> {
        macro_rules! audit_event {
            ($lvl:expr) => {
                tracing::event!(
                    target: AUDIT_TARGET,
                    $lvl,
                    remote_addr = %RemoteDisplay(&record.remote_addr),
                    method = %record.method,
                    path = %record.path,
                    status = record.status.as_u16(),
                    user_agent = record.user_agent.as_deref().unwrap_or("-"),
                    reason = record.reason.as_str(),
                    "{record}"
                )
            };
        }

        match level {
            Level::ERROR => audit_event!(Level::ERROR),
            Level::WARN => audit_event!(Level::WARN),
            Level::INFO => audit_event!(Level::INFO),
            Level::DEBUG => audit_event!(Level::DEBUG),
            _ => audit_event!(Level::TRACE),
        }
        Ok(())
    }
}

/// Audit decision plus sink, shared by every request.
#[derive(Clone)]
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    level: Level,
    agents: SuspiciousAgents,
}

impl AuditLogger {
    pub fn new(sink: Arc<dyn AuditSink>, level: Level, agents: SuspiciousAgents) -> Self {
        Self { sink, level, agents }
    }

    /// Warning-level logger writing through `tracing`.
    pub fn tracing(agents: SuspiciousAgents) -> Self {
        Self::new(Arc::new(TracingAuditSink), Level::WARN, agents)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Emits at most one record for the pair and returns why it was emitted.
    ///
    /// A missing context is reported as
    /// [`HardeningError::RequestContextUnavailable`] rather than guessed at.
    pub fn observe(
        &self,
        context: Option<&RequestContext>,
        status: StatusCode,
    ) -> Result<Option<AuditReason>, HardeningError> {
        let context = context.ok_or(HardeningError::RequestContextUnavailable)?;
        let Some(reason) = self.reason_for(context, status) else {
            return Ok(None);
        };

        let record = AuditRecord::new(context, status, reason);
        self.sink.emit(self.level, &record)?;
        Ok(Some(reason))
    }

    fn reason_for(&self, context: &RequestContext, status: StatusCode) -> Option<AuditReason> {
        if status.as_u16() >= 400 {
            Some(AuditReason::ErrorStatus)
        } else if self.agents.is_suspicious(context.user_agent()) {
            Some(AuditReason::SuspiciousAgent)
        } else {
            None
        }
    }
}

impl fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLogger")
            .field("level", &self.level)
            .field("agents", &self.agents)
            .finish_non_exhaustive()
    }
}
