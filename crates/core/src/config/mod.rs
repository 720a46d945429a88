//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELTER_*)
//! 2. TOML config file (if SHELTER_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded value is built once at startup and handed to every component
//! that needs it; nothing reads configuration from globals.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::classify::ClassifierConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELTER_*)
/// 2. TOML config file (if SHELTER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name; prefixes every namespace name.
    ///
    /// Set via SHELTER_APP_NAME environment variable.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment generation tag embedded in namespace names.
    ///
    /// Bumping this starts a fresh generation; the next activation deletes
    /// every namespace from older generations.
    /// Set via SHELTER_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Path to the SQLite namespace store.
    ///
    /// Set via SHELTER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker serves; root-relative manifest entries and the
    /// navigation fallback resolve against it.
    ///
    /// Set via SHELTER_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Assets fetched into the pre-populated namespace at install.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// User-Agent string for network requests.
    ///
    /// Set via SHELTER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout in milliseconds. A timed-out fetch counts as a
    /// network failure.
    ///
    /// Set via SHELTER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Request classification table.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Push notification presentation.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Background-sync tag that triggers the sync procedure.
    ///
    /// Set via SHELTER_SYNC_TAG environment variable.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,
}

/// Push notification presentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_badge")]
    pub badge: String,
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u32>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { icon: default_icon(), badge: default_badge(), vibrate: default_vibrate() }
    }
}

/// Namespace names that make up the current generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNames {
    /// Assets written at install time (and by cache-first fetches).
    pub precache: String,
    /// Responses written opportunistically at runtime.
    pub runtime: String,
}

impl CacheNames {
    pub fn new(app_name: &str, version: &str) -> Self {
        Self { precache: format!("{app_name}-v{version}"), runtime: format!("{app_name}-runtime-v{version}") }
    }

    /// Whether `name` belongs to the current generation.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.precache || name == self.runtime
    }
}

fn default_app_name() -> String {
    "shelter".into()
}

fn default_cache_version() -> String {
    "1.0".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shelter-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_manifest() -> Vec<String> {
    vec!["/".into(), "/index.html".into()]
}

fn default_user_agent() -> String {
    "shelter/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_sync_tag() -> String {
    "sync-data".into()
}

fn default_icon() -> String {
    "/icon-192.png".into()
}

fn default_badge() -> String {
    "/badge-72.png".into()
}

fn default_vibrate() -> Vec<u32> {
    vec![100, 50, 100]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            cache_version: default_cache_version(),
            db_path: default_db_path(),
            origin: default_origin(),
            manifest: default_manifest(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            classifier: ClassifierConfig::default(),
            notification: NotificationConfig::default(),
            sync_tag: default_sync_tag(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Namespace names of the current generation.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames::new(&self.app_name, &self.cache_version)
    }

    /// The configured origin as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute HTTP(S) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be http or https".into() });
        }

        Ok(url)
    }

    /// URL of the site root, served to navigations when offline.
    pub fn root_url(&self) -> Result<Url, ConfigError> {
        let origin = self.origin_url()?;
        origin
            .join("/")
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELTER_`
    /// 2. TOML file from `SHELTER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELTER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELTER_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "shelter");
        assert_eq!(config.cache_version, "1.0");
        assert_eq!(config.db_path, PathBuf::from("./shelter-cache.sqlite"));
        assert_eq!(config.manifest, vec!["/".to_string(), "/index.html".to_string()]);
        assert_eq!(config.user_agent, "shelter/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.sync_tag, "sync-data");
        assert_eq!(config.notification.vibrate, vec![100, 50, 100]);
        assert_eq!(config.classifier.rules.len(), 3);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_cache_names_embed_version() {
        let config = AppConfig { app_name: "sonar".into(), cache_version: "2.2".into(), ..Default::default() };
        let names = config.cache_names();
        assert_eq!(names.precache, "sonar-v2.2");
        assert_eq!(names.runtime, "sonar-runtime-v2.2");
        assert!(names.is_current("sonar-v2.2"));
        assert!(!names.is_current("sonar-v2.1"));
    }

    #[test]
    fn test_root_url() {
        let config = AppConfig { origin: "https://app.example/base/path".into(), ..Default::default() };
        assert_eq!(config.root_url().unwrap().as_str(), "https://app.example/");
    }

    #[test]
    fn test_origin_must_be_http() {
        let config = AppConfig { origin: "ftp://app.example".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_round_trips_through_figment() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .extract()
            .unwrap();
        assert_eq!(config.classifier, ClassifierConfig::default());
        assert_eq!(config.notification, NotificationConfig::default());
    }
}
