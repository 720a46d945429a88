//! Network transport.
//!
//! The executors only see the [`Transport`] trait. Any `Err` it returns is a
//! network failure (unreachable host, DNS, timeout) and triggers the
//! strategy's fallback; HTTP error statuses are ordinary responses.
//!
//! [`FetchClient`] is the reqwest-backed implementation used in production.

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

use shelter_core::{AppConfig, Error, RequestDescriptor, Response};

/// Something that can perform a request against the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform `request`, returning whatever status the server sent.
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "shelter/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "shelter/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// reqwest-backed transport.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::NetworkUnreachable(err.to_string())
    }
}

/// Header pairs with textual values; opaque values are logged and skipped.
fn collect_headers(headers: &header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(v) => Some((name.as_str().to_string(), v.to_string())),
            Err(_) => {
                tracing::debug!(header = %name, bytes = value.len(), "dropping non-text header value");
                None
            }
        })
        .collect()
}

#[async_trait]
impl Transport for FetchClient {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.as_str())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            url = %request.url,
            status,
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(Response::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "shelter/0.1");
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "test-agent".into(), timeout_ms: 1500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_collect_headers() {
        let mut map = header::HeaderMap::new();
        map.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/css"));
        let headers = collect_headers(&map);
        assert_eq!(headers, vec![("content-type".to_string(), "text/css".to_string())]);
    }

    #[test]
    fn test_collect_headers_skips_opaque_values() {
        let mut map = header::HeaderMap::new();
        map.insert(header::ETAG, header::HeaderValue::from_static("\"v1\""));
        map.insert("x-raw", header::HeaderValue::from_bytes(&[b'a', 0xff]).unwrap());
        let headers = collect_headers(&map);
        assert_eq!(headers, vec![("etag".to_string(), "\"v1\"".to_string())]);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let config = FetchConfig { timeout: Duration::from_millis(500), ..Default::default() };
        let client = FetchClient::new(config).unwrap();
        let request = RequestDescriptor::get("http://127.0.0.1:9/unreachable").unwrap();
        let err = client.fetch(&request).await.unwrap_err();
        assert!(err.is_network());
    }
}
