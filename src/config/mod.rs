//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (PORT, HOST)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; header values never change at runtime
//! - All fields have defaults so the server runs with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ListenerConfig, LogFormat, LoggingConfig, ObservabilityConfig, SecurityConfig, SiteConfig,
    TimeoutConfig,
};
