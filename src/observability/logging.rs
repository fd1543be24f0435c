//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the console subscriber (pretty or JSON)
//! - Route audit events to the rotating security log
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Console level configurable via `RUST_LOG`, falling back to config
//! - The audit file only ever receives the `audit` target at WARN and above
//! - Audit lines are handed to a background writer thread; a slow disk drops
//!   lines instead of holding up responses

use std::io;
use std::path::{Path, PathBuf};

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{LogFormat, LoggingConfig};
use crate::observability::audit::AUDIT_TARGET;
use crate::observability::rotation::RotatingFile;

/// Error type for logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open audit log: {0}")]
    AuditFile(#[from] io::Error),
    #[error("failed to install subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Keeps the audit writer thread alive. Dropping it flushes pending lines.
#[must_use = "dropping the guard stops the audit writer"]
#[derive(Debug)]
pub struct LoggingGuard {
    audit_path: PathBuf,
    _worker: WorkerGuard,
}

impl LoggingGuard {
    pub fn audit_path(&self) -> &Path {
        &self.audit_path
    }
}

/// Layer writing audit events, and nothing else, to `writer`.
pub fn audit_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(AUDIT_TARGET, Level::WARN))
}

fn console_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hardened_page={level},tower_http={level},{AUDIT_TARGET}=warn",
            level = config.level
        ))
    })
}

/// Installs the global subscriber. Hold the returned guard until exit.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let file = RotatingFile::open(&config.audit_path, config.max_bytes, config.max_files)?;
    let audit_path = file.path().to_path_buf();
    let (writer, worker) = NonBlockingBuilder::default()
        .lossy(true)
        .thread_name("audit-log")
        .finish(file);

    let console = match config.format {
        LogFormat::Json => fmt::layer().json().with_filter(console_filter(config)).boxed(),
        LogFormat::Pretty => fmt::layer().with_filter(console_filter(config)).boxed(),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(audit_layer(writer))
        .try_init()?;

    Ok(LoggingGuard {
        audit_path,
        _worker: worker,
    })
}
