//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the page handlers
//! - Wire up middleware (hardening, tracing, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::http::middleware::{harden_response, ResponseHardening};
use crate::http::pages;
use crate::lifecycle::ShutdownSignal;

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &SiteConfig, hardening: Arc<ResponseHardening>) -> Self {
        Self {
            router: Self::build_router(config, hardening),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Hardening is added last so it wraps everything, including timeouts.
    #[allow(deprecated)]
    pub fn build_router(config: &SiteConfig, hardening: Arc<ResponseHardening>) -> Router {
        Router::new()
            .route("/", get(pages::home))
            .fallback(pages::not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(hardening, harden_response))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
