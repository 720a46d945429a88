//! Request classification.
//!
//! Maps every intercepted request to exactly one caching strategy by
//! walking an ordered rule table; the first matching rule wins and a
//! fallback strategy catches everything else. Requests that are not
//! GET, not HTTP(S), or whose path carries a pass-through marker are not
//! intercepted at all.
//!
//! The table is plain configuration ([`ClassifierConfig`]), so patterns can
//! be added or removed without touching the executors.

mod rules;

pub use rules::RuleConfig;

use rules::CompiledRule;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::request::{RequestDescriptor, is_http};

/// Caching strategy selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Freshness first: network, then cache, then a synthesized 503.
    NetworkFirst,
    /// Availability first: cache, then network, then a synthesized 404.
    CacheFirst,
    /// Serve whatever is cached now and refresh it in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheFirst => "cache-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path substrings that exempt a request from interception.
    #[serde(default)]
    pub passthrough_path_markers: Vec<String>,

    /// Ordered rules; the first match wins.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Strategy for requests no rule matches.
    #[serde(default = "default_strategy")]
    pub default_strategy: Strategy,
}

fn default_strategy() -> Strategy {
    Strategy::NetworkFirst
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            passthrough_path_markers: vec!["indexeddb".into()],
            rules: vec![
                RuleConfig::new(Strategy::NetworkFirst)
                    .path_contains(&["/api/"])
                    .query_params(&["nocache"]),
                RuleConfig::new(Strategy::CacheFirst)
                    .extensions(&["css", "js", "woff2", "woff"])
                    .hosts(&["fonts.googleapis.com", "fonts.gstatic.com", "cdn.jsdelivr.net"]),
                RuleConfig::new(Strategy::StaleWhileRevalidate)
                    .extensions(&["jpg", "jpeg", "png", "gif", "svg", "webp", "mp3", "wav", "ogg"])
                    .hosts(&["unsplash.com"])
                    .case_insensitive(true),
            ],
            default_strategy: default_strategy(),
        }
    }
}

/// Compiled classification table.
#[derive(Debug, Clone)]
pub struct Classifier {
    passthrough: Vec<String>,
    rules: Vec<CompiledRule>,
    fallback: Strategy,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            passthrough: config
                .passthrough_path_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            rules: config.rules.iter().map(CompiledRule::compile).collect(),
            fallback: config.default_strategy,
        }
    }

    /// Whether the worker handles this request at all.
    pub fn intercepts(&self, request: &RequestDescriptor) -> bool {
        if !request.is_get() || !is_http(&request.url) {
            return false;
        }

        let path = request.url.path();
        !self.passthrough.iter().any(|marker| path.contains(marker.as_str()))
    }

    /// Strategy for a request, ignoring interception eligibility.
    ///
    /// Total: falls back to the default strategy when no rule matches.
    pub fn strategy_for(&self, request: &RequestDescriptor) -> Strategy {
        self.rules
            .iter()
            .find(|rule| rule.matches(&request.url))
            .map(|rule| rule.strategy)
            .unwrap_or(self.fallback)
    }

    /// Classify a request; `None` means it passes through untouched.
    pub fn classify(&self, request: &RequestDescriptor) -> Option<Strategy> {
        if !self.intercepts(request) {
            return None;
        }
        Some(self.strategy_for(request))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
