//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, graceful shutdown)
//!     → middleware/hardening.rs (capture request context)
//!     → pages.rs (static page or 404)
//!     → middleware/hardening.rs (strip Server, inject headers, audit)
//!     → Send to client
//! ```

pub mod context;
pub mod middleware;
pub mod pages;
pub mod server;

pub use context::RequestContext;
pub use middleware::ResponseHardening;
pub use server::HttpServer;
