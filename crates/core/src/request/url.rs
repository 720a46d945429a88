//! URL canonicalization for consistent cache keys.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Whether the URL uses a scheme the worker intercepts.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Canonicalize an absolute request URL.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Lowercase the host
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
///
/// Non-HTTP schemes are accepted here so that the dispatcher can see them
/// and let them pass through.
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        if lowered != host {
            parsed
                .set_host(Some(&lowered))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        }
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a manifest entry against the worker origin.
///
/// Entries may be absolute (`https://cdn.example/app.css`) or root-relative
/// (`/index.html`). The result must be HTTP(S).
pub fn resolve(origin: &Url, entry: &str) -> Result<Url, UrlError> {
    let trimmed = entry.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut joined = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if !is_http(&joined) {
        return Err(UrlError::UnsupportedScheme(joined.scheme().to_string()));
    }

    joined.set_fragment(None);

    Ok(joined)
}
