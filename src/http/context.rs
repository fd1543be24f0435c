//! Request context captured before the inner service runs.

use std::fmt;
use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{header, Method, Request},
};

/// What the audit log needs to know about the request that produced a
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// `None` when the server was not started with connect info.
    pub remote_addr: Option<SocketAddr>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn capture<B>(request: &Request<B>) -> Self {
        let remote_addr = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        // Lossy so that non-ASCII agents are still checked.
        let user_agent = request
            .headers()
            .get(header::USER_AGENT)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            remote_addr,
            user_agent,
        }
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or_default()
    }
}

/// Formats the remote address as its IP, or `-` when unknown.
pub struct RemoteDisplay<'a>(pub &'a Option<SocketAddr>);

impl fmt::Display for RemoteDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(addr) => write!(f, "{}", addr.ip()),
            None => f.write_str("-"),
        }
    }
}
