//! Security response headers.
//!
//! # Responsibilities
//! - Strip the identifying `Server` header from every response
//! - Inject the fixed hardening header set, overwriting existing values
//! - Replace `Server` with a non-identifying placeholder
//!
//! # Design Decisions
//! - Policy is built once at startup and shared read-only
//! - `insert` replaces every existing value, so applying twice is a no-op
//! - Header names are matched case-insensitively by `HeaderMap`

use axum::http::{
    header::{self, HeaderName, InvalidHeaderValue},
    response::Builder,
    HeaderMap, HeaderValue, Response,
};

use crate::error::HardeningError;

/// `Content-Security-Policy` served on every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     style-src 'self' https://cdn.jsdelivr.net; \
     script-src 'self' https://cdn.jsdelivr.net; \
     frame-ancestors 'none'; \
     form-action 'self'";

pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=63072000; includeSubDomains; preload";
pub const PERMISSIONS_POLICY: &str = "geolocation=(), camera=(), microphone=()";
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, private";

/// Default value written to the `Server` header.
pub const DEFAULT_SERVER_PLACEHOLDER: &str = "Secure";

/// Anything that carries a header collection the policy can be written into.
pub trait HeaderTarget {
    /// Returns the mutable header map, or `None` when the target has none.
    fn header_map(&mut self) -> Option<&mut HeaderMap>;
}

impl HeaderTarget for HeaderMap {
    fn header_map(&mut self) -> Option<&mut HeaderMap> {
        Some(self)
    }
}

impl<B> HeaderTarget for Response<B> {
    fn header_map(&mut self) -> Option<&mut HeaderMap> {
        Some(self.headers_mut())
    }
}

/// A builder that already recorded an error exposes no headers.
impl HeaderTarget for Builder {
    fn header_map(&mut self) -> Option<&mut HeaderMap> {
        self.headers_mut()
    }
}

/// Ordered set of headers applied to every outgoing response.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    entries: Vec<(HeaderName, HeaderValue)>,
    server: HeaderValue,
}

impl HeaderPolicy {
    /// Builds the hardened policy with a custom `Server` placeholder.
    pub fn with_server_placeholder(placeholder: &str) -> Result<Self, InvalidHeaderValue> {
        Ok(Self::build(HeaderValue::from_str(placeholder)?))
    }

    fn build(server: HeaderValue) -> Self {
        let entries = vec![
            (
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(CONTENT_SECURITY_POLICY),
            ),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
            (
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
            ),
            (
                HeaderName::from_static("permissions-policy"),
                HeaderValue::from_static(PERMISSIONS_POLICY),
            ),
            (
                HeaderName::from_static("cross-origin-resource-policy"),
                HeaderValue::from_static("same-origin"),
            ),
            (
                HeaderName::from_static("cross-origin-opener-policy"),
                HeaderValue::from_static("same-origin"),
            ),
            (
                HeaderName::from_static("cross-origin-embedder-policy"),
                HeaderValue::from_static("require-corp"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (header::EXPIRES, HeaderValue::from_static("0")),
        ];

        Self { entries, server }
    }

    /// Policy entries in application order, excluding `Server`.
    pub fn entries(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    /// The value written to `Server`.
    pub fn server_placeholder(&self) -> &HeaderValue {
        &self.server
    }

    /// Strips `Server`, writes every policy entry and then the placeholder.
    pub fn apply<T>(&self, target: &mut T) -> Result<(), HardeningError>
    where
        T: HeaderTarget + ?Sized,
    {
        let headers = target
            .header_map()
            .ok_or(HardeningError::MissingHeaderTarget)?;

        // Removes every value stored under the name, not just the first.
        headers.remove(header::SERVER);

        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
        headers.insert(header::SERVER, self.server.clone());

        Ok(())
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::build(HeaderValue::from_static(DEFAULT_SERVER_PLACEHOLDER))
    }
}
