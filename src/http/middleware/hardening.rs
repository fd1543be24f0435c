//! Response hardening middleware.
//!
//! Runs outermost, so 404s, timeouts and handler errors are hardened too.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, header::InvalidHeaderValue, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::SecurityConfig;
use crate::error::HardeningError;
use crate::http::context::RequestContext;
use crate::observability::{metrics, AuditLogger};
use crate::security::{HeaderPolicy, SuspiciousAgents};

/// Header policy plus audit logger, shared by every request.
#[derive(Debug, Clone)]
pub struct ResponseHardening {
    policy: HeaderPolicy,
    audit: AuditLogger,
}

impl ResponseHardening {
    pub fn new(policy: HeaderPolicy, audit: AuditLogger) -> Self {
        Self { policy, audit }
    }

    /// Production wiring: configured placeholder and agents, audit via `tracing`.
    pub fn from_config(security: &SecurityConfig) -> Result<Self, InvalidHeaderValue> {
        let policy = HeaderPolicy::with_server_placeholder(&security.server_placeholder)?;
        let agents = SuspiciousAgents::new(&security.suspicious_user_agents);
        Ok(Self::new(policy, AuditLogger::tracing(agents)))
    }

    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }

    /// Hardens `response` and records it in the audit log if flagged.
    ///
    /// `context` is `None` when there is no request behind the response.
    pub fn finish(&self, context: Option<&RequestContext>, mut response: Response) -> Response {
        if let Err(error) = self.policy.apply(&mut response) {
            tracing::error!(%error, "Cannot apply header policy");
            return self.internal_error();
        }
        metrics::record_hardened(response.status().as_u16());

        match self.audit.observe(context, response.status()) {
            Ok(Some(reason)) => metrics::record_audit_event(reason.as_str()),
            Ok(None) => {}
            Err(HardeningError::RequestContextUnavailable) => {
                tracing::debug!(status = %response.status(), "No request context, audit skipped");
            }
            Err(error) => {
                metrics::record_audit_dropped();
                tracing::debug!(%error, "Audit record dropped");
            }
        }

        response
    }

    fn internal_error(&self) -> Response {
        let mut response = Response::new(Body::from("Internal Server Error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        // A bare `HeaderMap` is always a valid target.
        let _ = self.policy.apply(response.headers_mut());
        response
    }
}

/// Middleware function for response hardening.
pub async fn harden_response(
    State(hardening): State<Arc<ResponseHardening>>,
    request: Request,
    next: Next,
) -> Response {
    let context = RequestContext::capture(&request);
    let response = next.run(request).await;
    hardening.finish(Some(&context), response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use axum::{extract::ConnectInfo, middleware, routing::get, Router};
    use tower::ServiceExt;
    use tracing::Level;
    use tracing_subscriber::{layer::SubscriberExt, Registry};

    use crate::http::pages;
    use crate::observability::{logging::audit_layer, AuditRecord, AuditSink, RotatingFile};

    #[derive(Default)]
    struct MemorySink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl MemorySink {
        fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl AuditSink for MemorySink {
        fn emit(&self, _level: Level, record: &AuditRecord) -> Result<(), HardeningError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn emit(&self, _level: Level, _record: &AuditRecord) -> Result<(), HardeningError> {
            Err(std::io::Error::other("permission denied").into())
        }
    }

    fn hardening(sink: Arc<dyn AuditSink>) -> Arc<ResponseHardening> {
        Arc::new(ResponseHardening::new(
            HeaderPolicy::default(),
            AuditLogger::new(sink, Level::WARN, SuspiciousAgents::default()),
        ))
    }

    async fn leaky() -> Response {
        let mut response = Response::new(Body::from("leaky"));
        let headers = response.headers_mut();
        headers.insert(header::SERVER, HeaderValue::from_static("axum/0.8"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("public, max-age=600"));
        headers.insert("x-app", HeaderValue::from_static("kept"));
        response
    }

    async fn boom() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn app(hardening: Arc<ResponseHardening>) -> Router {
        Router::new()
            .route("/", get(pages::home))
            .route("/leaky", get(leaky))
            .route("/boom", get(boom))
            .fallback(pages::not_found)
            .layer(middleware::from_fn_with_state(hardening, harden_response))
    }

    fn get_request(uri: &str, user_agent: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(agent) = user_agent {
            builder = builder.header(header::USER_AGENT, agent);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn assert_hardened(response: &Response) {
        let headers = response.headers();
        for (name, value) in HeaderPolicy::default().entries() {
            assert_eq!(headers.get(name), Some(value), "header {name}");
        }
        assert_eq!(headers.get_all(header::SERVER).iter().count(), 1);
        assert_eq!(headers.get(header::SERVER).unwrap(), "Secure");
    }

    #[tokio::test]
    async fn test_home_page_is_hardened() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink.clone()))
            .oneshot(get_request("/", Some("Mozilla/5.0")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_hardened(&response);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store, no-cache, must-revalidate, private"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, pages::HOME_PAGE.as_bytes());
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn test_not_found_is_hardened_and_logged_once() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink.clone()))
            .oneshot(get_request("/wp-login.php", Some("Mozilla/5.0")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_hardened(&response);

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, "/wp-login.php");
        assert_eq!(records[0].status, StatusCode::NOT_FOUND);
        assert_eq!(records[0].user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_scanner_agent_logged_on_success() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink.clone()))
            .oneshot(get_request("/", Some("SqlMap/1.8#dev")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_missing_user_agent_not_suspicious() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink.clone()))
            .oneshot(get_request("/", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.count(), 0);
    }

    #[tokio::test]
    async fn test_handler_headers_overridden_others_kept() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink))
            .oneshot(get_request("/leaky", None))
            .await
            .unwrap();

        assert_hardened(&response);
        assert_eq!(response.headers().get("x-app").unwrap(), "kept");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"leaky");
    }

    #[tokio::test]
    async fn test_server_error_is_hardened_and_logged() {
        let sink = Arc::new(MemorySink::default());
        let response = app(hardening(sink.clone()))
            .oneshot(get_request("/boom", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hardened(&response);
        assert_eq!(sink.count(), 1);
    }

    #[tokio::test]
    async fn test_broken_sink_does_not_affect_response() {
        let response = app(hardening(Arc::new(BrokenSink)))
            .oneshot(get_request("/", Some("sqlmap/1.7")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_hardened(&response);
    }

    #[tokio::test]
    async fn test_double_layer_is_idempotent() {
        let sink = Arc::new(MemorySink::default());
        let shared = hardening(sink.clone());
        let once = app(shared.clone())
            .oneshot(get_request("/leaky", None))
            .await
            .unwrap();
        let twice = app(shared.clone())
            .layer(middleware::from_fn_with_state(shared, harden_response))
            .oneshot(get_request("/leaky", None))
            .await
            .unwrap();

        assert_eq!(once.headers(), twice.headers());
    }

    #[test]
    fn test_finish_without_context_skips_audit() {
        let sink = Arc::new(MemorySink::default());
        let hardening = hardening(sink.clone());
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::SERVICE_UNAVAILABLE;

        let response = hardening.finish(None, response);

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_hardened(&response);
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_from_config_uses_placeholder() {
        let security = SecurityConfig {
            server_placeholder: "edge".to_string(),
            suspicious_user_agents: vec!["evilbot".to_string()],
        };
        let hardening = ResponseHardening::from_config(&security).unwrap();

        let response = hardening.finish(None, Response::new(Body::empty()));

        assert_eq!(response.headers().get(header::SERVER).unwrap(), "edge");
        assert_eq!(hardening.policy().server_placeholder(), "edge");
    }

    #[test]
    fn test_internal_error_is_hardened() {
        let hardening = hardening(Arc::new(MemorySink::default()));
        let response = hardening.internal_error();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hardened(&response);
    }

    fn from_peer(uri: &str, user_agent: &str, peer: &str) -> Request {
        let mut request = get_request(uri, Some(user_agent));
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    }

    #[tokio::test]
    async fn test_configured_audit_writes_security_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("security.log");
        let file = Arc::new(RotatingFile::open(&path, 1_000_000, 5).unwrap());
        let _default =
            tracing::subscriber::set_default(Registry::default().with(audit_layer(file)));

        let shared = Arc::new(ResponseHardening::from_config(&SecurityConfig::default()).unwrap());
        let missing = app(shared.clone())
            .oneshot(from_peer("/x", "Mozilla", "203.0.113.9:51000"))
            .await
            .unwrap();
        let scanner = app(shared.clone())
            .oneshot(from_peer("/", "SQLMAP", "203.0.113.10:51001"))
            .await
            .unwrap();
        let benign = app(shared)
            .oneshot(from_peer("/", "Mozilla", "203.0.113.11:51002"))
            .await
            .unwrap();

        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(scanner.status(), StatusCode::OK);
        assert_eq!(benign.status(), StatusCode::OK);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2, "{contents}");
        assert!(lines.iter().all(|line| line.contains("WARN")));
        assert!(lines[0].contains("203.0.113.9 GET /x 404 \"Mozilla\""));
        assert!(lines[0].contains("reason=\"error_status\""));
        assert!(lines[1].contains("203.0.113.10 GET / 200 \"SQLMAP\""));
        assert!(lines[1].contains("reason=\"suspicious_agent\""));
    }

    struct SlowWriter {
        delay: Duration,
        written: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for SlowWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            std::thread::sleep(self.delay);
            self.written.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_audit_writer_does_not_delay_response() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let slow = SlowWriter {
            delay: Duration::from_millis(500),
            written: written.clone(),
        };
        let (writer, worker) = tracing_appender::non_blocking(slow);
        let default =
            tracing::subscriber::set_default(Registry::default().with(audit_layer(writer)));

        let shared = Arc::new(ResponseHardening::from_config(&SecurityConfig::default()).unwrap());
        let started = Instant::now();
        let response = app(shared)
            .oneshot(from_peer("/missing", "Mozilla", "192.0.2.1:40000"))
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_hardened(&response);
        assert!(elapsed < Duration::from_millis(250), "took {elapsed:?}");

        drop(default);
        // Flushes the queued line before returning.
        drop(worker);
        let written = String::from_utf8(written.lock().unwrap().clone()).unwrap();
        assert!(written.contains("192.0.2.1 GET /missing 404"), "{written}");
    }
}
