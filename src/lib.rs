//! Hardened static page server library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::SiteConfig;
pub use error::HardeningError;
pub use http::{HttpServer, ResponseHardening};
pub use lifecycle::Shutdown;
