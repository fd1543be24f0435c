//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use hardened_page::config::SiteConfig;
use hardened_page::http::{HttpServer, ResponseHardening};
use hardened_page::lifecycle::Shutdown;
use hardened_page::observability::{AuditLogger, AuditRecord, AuditSink};
use hardened_page::security::{HeaderPolicy, SuspiciousAgents};
use hardened_page::HardeningError;
use tokio::net::TcpListener;
use tracing::Level;

/// Sink that keeps every record in memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn emit(&self, _level: Level, record: &AuditRecord) -> Result<(), HardeningError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Sink whose every write fails, like a full disk.
#[allow(dead_code)]
pub struct FailingAuditSink;

impl AuditSink for FailingAuditSink {
    fn emit(&self, _level: Level, _record: &AuditRecord) -> Result<(), HardeningError> {
        Err(std::io::Error::other("No space left on device").into())
    }
}

pub fn hardening(sink: Arc<dyn AuditSink>) -> Arc<ResponseHardening> {
    Arc::new(ResponseHardening::new(
        HeaderPolicy::default(),
        AuditLogger::new(sink, Level::WARN, SuspiciousAgents::default()),
    ))
}

/// Start the server on an ephemeral loopback port.
pub async fn start_server(hardening: Arc<ResponseHardening>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&SiteConfig::default(), hardening);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
