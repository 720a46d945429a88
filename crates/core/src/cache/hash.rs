//! Request cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// Keys depend only on the method and the canonical URL, so the same
/// resource maps to the same key in every namespace.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://example.com/app.css");
        let hash2 = compute_cache_key("GET", "https://example.com/app.css");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_differs_by_url() {
        let hash1 = compute_cache_key("GET", "https://example.com/a.css");
        let hash2 = compute_cache_key("GET", "https://example.com/b.css");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_differs_by_method() {
        let hash1 = compute_cache_key("GET", "https://example.com/");
        let hash2 = compute_cache_key("HEAD", "https://example.com/");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = compute_cache_key("GET", "https://example.com/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
