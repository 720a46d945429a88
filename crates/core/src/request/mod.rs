//! Request descriptors and responses exchanged between the dispatcher,
//! the executors and the transport.

pub mod url;

use std::borrow::Cow;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use self::url::{UrlError, canonicalize, is_http, resolve};
use crate::Error;
use crate::cache::hash::compute_cache_key;

/// The only status code whose responses are ever written to the cache.
pub const SUCCESS_STATUS: u16 = 200;

/// Body of the response synthesized when the network and the cache both fail.
pub const OFFLINE_BODY: &str = "Offline - No cached version available";

/// Body of the response synthesized when a cache-first fetch fails.
pub const NOT_AVAILABLE_BODY: &str = "Resource not available";

/// An intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Upper-case HTTP method.
    pub method: String,
    /// Canonical absolute URL.
    pub url: ::url::Url,
    /// Whether the request loads a top-level document.
    pub navigate: bool,
}

impl RequestDescriptor {
    /// Build a descriptor from raw parts, canonicalizing the URL.
    pub fn new(method: &str, url: &str, navigate: bool) -> Result<Self, Error> {
        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() {
            return Err(Error::InvalidInput("method cannot be empty".into()));
        }

        let url = canonicalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self { method, url, navigate })
    }

    /// A plain subresource GET.
    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new("GET", url, false)
    }

    /// A top-level document GET.
    pub fn navigation(url: &str) -> Result<Self, Error> {
        Self::new("GET", url, true)
    }

    /// GET for an already canonical URL.
    pub fn from_url(url: ::url::Url) -> Self {
        Self { method: "GET".into(), url, navigate: false }
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key under which responses to this request are cached.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}

/// A response, either from the network, the cache, or synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// `503 Service Unavailable` with a plain-text offline message.
    pub fn offline() -> Self {
        Self::new(503, vec![("content-type".into(), "text/plain".into())], OFFLINE_BODY)
    }

    /// `404 Not Found` returned when a cache-first fetch cannot reach the network.
    pub fn not_available() -> Self {
        Self::new(404, Vec::new(), NOT_AVAILABLE_BODY)
    }

    /// Whether this response may be written to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
