//! Rule table configuration and predicate matching.

use serde::{Deserialize, Serialize};
use url::Url;

use super::Strategy;

/// One row of the classification table.
///
/// A rule matches when ANY of its predicates matches. Rules with no
/// predicates are rejected by config validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Strategy selected when this rule matches.
    pub strategy: Strategy,

    /// Substrings searched for in the URL path (e.g. `/api/`).
    #[serde(default)]
    pub path_contains: Vec<String>,

    /// Query parameter names whose presence selects this rule (e.g. `nocache`).
    #[serde(default)]
    pub query_params: Vec<String>,

    /// File extensions of the last path segment, without the dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Hosts matched exactly or as a parent domain.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Match `extensions` ignoring ASCII case.
    #[serde(default)]
    pub case_insensitive: bool,
}

impl RuleConfig {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            path_contains: Vec::new(),
            query_params: Vec::new(),
            extensions: Vec::new(),
            hosts: Vec::new(),
            case_insensitive: false,
        }
    }

    pub fn path_contains(mut self, markers: &[&str]) -> Self {
        self.path_contains.extend(markers.iter().map(|s| s.to_string()));
        self
    }

    pub fn query_params(mut self, params: &[&str]) -> Self {
        self.query_params.extend(params.iter().map(|s| s.to_string()));
        self
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.extensions.extend(exts.iter().map(|s| s.to_string()));
        self
    }

    pub fn hosts(mut self, hosts: &[&str]) -> Self {
        self.hosts.extend(hosts.iter().map(|s| s.to_string()));
        self
    }

    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// True if the rule has no predicate at all.
    pub fn is_empty(&self) -> bool {
        self.path_contains.is_empty()
            && self.query_params.is_empty()
            && self.extensions.is_empty()
            && self.hosts.is_empty()
    }
}

/// A rule with its patterns normalized for matching.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) strategy: Strategy,
    path_contains: Vec<String>,
    query_params: Vec<String>,
    extensions: Vec<String>,
    hosts: Vec<String>,
    case_insensitive: bool,
}

impl CompiledRule {
    pub(crate) fn compile(rule: &RuleConfig) -> Self {
        Self {
            strategy: rule.strategy,
            path_contains: rule.path_contains.iter().filter(|s| !s.is_empty()).cloned().collect(),
            query_params: rule.query_params.clone(),
            extensions: rule
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
            hosts: rule
                .hosts
                .iter()
                .map(|h| h.trim_start_matches('.').to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            case_insensitive: rule.case_insensitive,
        }
    }

    pub(crate) fn matches(&self, url: &Url) -> bool {
        let path = url.path();

        if self.path_contains.iter().any(|marker| path.contains(marker.as_str())) {
            return true;
        }

        if !self.query_params.is_empty() && url.query_pairs().any(|(k, _)| self.query_params.iter().any(|p| *p == k)) {
            return true;
        }

        if let Some(ext) = extension(path)
            && self.extensions.iter().any(|e| {
                if self.case_insensitive { e.eq_ignore_ascii_case(ext) } else { e == ext }
            })
        {
            return true;
        }

        match url.host_str() {
            Some(host) => self.hosts.iter().any(|h| host_matches(host, h)),
            None => false,
        }
    }
}

/// Extension of the last path segment, case preserved.
pub(crate) fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext)
}

fn host_matches(host: &str, pattern: &str) -> bool {
    host == pattern || host.strip_suffix(pattern).is_some_and(|prefix| prefix.ends_with('.'))
}
