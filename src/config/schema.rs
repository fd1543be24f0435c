//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observability::rotation::{DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES};
use crate::security::agents::DEFAULT_SUSPICIOUS_AGENTS;
use crate::security::headers::DEFAULT_SERVER_PLACEHOLDER;

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Response hardening settings.
    pub security: SecurityConfig,

    /// Console and audit log settings.
    pub logging: LoggingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port; overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Response hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Value written to the `Server` header on every response.
    pub server_placeholder: String,

    /// Case-insensitive user-agent substrings that trigger an audit record.
    pub suspicious_user_agents: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            server_placeholder: DEFAULT_SERVER_PLACEHOLDER.to_string(),
            suspicious_user_agents: DEFAULT_SUSPICIOUS_AGENTS
                .iter()
                .map(|agent| agent.to_string())
                .collect(),
        }
    }
}

/// Console output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console log level (trace, debug, info, warn, error).
    pub level: String,

    /// Console output format.
    pub format: LogFormat,

    /// Path of the rotating security audit log.
    pub audit_path: String,

    /// Size at which the audit log rolls over, in bytes.
    pub max_bytes: u64,

    /// Number of rolled-over audit files to keep.
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            audit_path: "logs/security.log".to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.security.server_placeholder, "Secure");
        assert!(config
            .security
            .suspicious_user_agents
            .contains(&"sqlmap".to_string()));
        assert_eq!(config.logging.max_bytes, 1_000_000);
        assert_eq!(config.logging.max_files, 5);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_ipv6_bind_address() {
        let listener = ListenerConfig {
            host: "::1".to_string(),
            port: 8080,
        };
        assert_eq!(listener.bind_address(), "[::1]:8080");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SiteConfig = toml::from_str(
            r#"
            [listener]
            port = 8443

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 8443);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.audit_path, "logs/security.log");
        assert_eq!(config.security, SecurityConfig::default());
    }
}
