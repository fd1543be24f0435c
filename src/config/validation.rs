//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, rotation limits)
//! - Check that header and address strings parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use tracing_subscriber::filter::LevelFilter;

use crate::config::schema::SiteConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,
    #[error("security.server_placeholder {0:?} is not a valid header value")]
    InvalidServerPlaceholder(String),
    #[error("security.server_placeholder must not be empty")]
    EmptyServerPlaceholder,
    #[error("logging.level {0:?} is not one of trace, debug, info, warn, error, off")]
    InvalidLogLevel(String),
    #[error("logging.audit_path must not be empty")]
    EmptyAuditPath,
    #[error("logging.max_bytes must be greater than zero")]
    ZeroMaxBytes,
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("observability.metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Checks every semantic constraint and reports all violations.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let placeholder = &config.security.server_placeholder;
    if placeholder.trim().is_empty() {
        errors.push(ValidationError::EmptyServerPlaceholder);
    } else if HeaderValue::from_str(placeholder).is_err() {
        errors.push(ValidationError::InvalidServerPlaceholder(placeholder.clone()));
    }

    if config.logging.level.parse::<LevelFilter>().is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.logging.level.clone()));
    }
    if config.logging.audit_path.trim().is_empty() {
        errors.push(ValidationError::EmptyAuditPath);
    }
    if config.logging.max_bytes == 0 {
        errors.push(ValidationError::ZeroMaxBytes);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
