//! Post-load checks on `AppConfig`.

use crate::config::AppConfig;
use crate::request::resolve;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted transport timeout, in milliseconds.
const TIMEOUT_RANGE_MS: RangeInclusive<u64> = 100..=300_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `app_name` or `cache_version` is empty,
    /// and `ConfigError::Invalid` if:
    /// - `origin` is not an absolute HTTP(S) URL
    /// - a manifest entry does not resolve to an HTTP(S) URL
    /// - `timeout_ms` is outside 100..=300000
    /// - `user_agent` is blank
    /// - a classifier rule has no predicate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "app_name".into(),
                hint: "Set SHELTER_APP_NAME environment variable".into(),
            });
        }
        if self.cache_version.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_version".into(),
                hint: "Set SHELTER_CACHE_VERSION environment variable".into(),
            });
        }

        let origin = self.origin_url()?;
        for entry in &self.manifest {
            resolve(&origin, entry)
                .map_err(|e| ConfigError::Invalid { field: "manifest".into(), reason: format!("{entry}: {e}") })?;
        }

        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: format!("{} ms is outside {:?}", self.timeout_ms, TIMEOUT_RANGE_MS),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "user_agent".into(),
                reason: "transport needs a User-Agent".into(),
            });
        }

        if let Some(index) = self.classifier.rules.iter().position(|rule| rule.is_empty()) {
            return Err(ConfigError::Invalid {
                field: format!("classifier.rules[{index}]"),
                reason: "rule must name at least one predicate".into(),
            });
        }

        if self.manifest.is_empty() {
            tracing::warn!("manifest is empty; install will not pre-populate any assets");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{RuleConfig, Strategy};

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_app_name() {
        let config = AppConfig { app_name: " ".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "app_name"));
    }

    #[test]
    fn test_validate_empty_cache_version() {
        let config = AppConfig { cache_version: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "cache_version"));
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_validate_bad_manifest_entry() {
        let config =
            AppConfig { manifest: vec!["/".into(), "mailto:someone@example.com".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "manifest"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        for (timeout_ms, ok) in [(99, false), (100, true), (300_000, true), (300_001, false)] {
            let config = AppConfig { timeout_ms, ..Default::default() };
            match config.validate() {
                Ok(()) => assert!(ok, "{timeout_ms} should be rejected"),
                Err(ConfigError::Invalid { field, .. }) => {
                    assert!(!ok, "{timeout_ms} should be accepted");
                    assert_eq!(field, "timeout_ms");
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_validate_blank_user_agent() {
        let config = AppConfig { user_agent: "  ".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_empty_rule() {
        let mut config = AppConfig::default();
        config.classifier.rules.push(RuleConfig::new(Strategy::CacheFirst));
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "classifier.rules[3]"));
    }

    #[test]
    fn test_validate_empty_manifest_is_allowed() {
        let config = AppConfig { manifest: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
