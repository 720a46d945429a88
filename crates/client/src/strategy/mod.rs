//! Caching strategy executors.
//!
//! Each executor turns an intercepted request into a response using the
//! namespace store and the network transport:
//!
//! - [`StrategyExecutor::network_first`]: freshness first, falling back to
//!   the cache and finally to a synthesized `503`.
//! - [`StrategyExecutor::cache_first`]: availability first, falling back to
//!   the network and finally to a synthesized `404`.
//! - [`StrategyExecutor::stale_while_revalidate`]: serve the cached entry
//!   now and refresh it in a detached task.
//!
//! Executors never return an error. Store failures during lookups are
//! logged and treated as misses; writes are detached and log their own
//! failures.
//!
//! Concurrent executions for the same key are not collapsed: each one
//! fetches and writes independently and the last write wins.

mod cache_first;
mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;

use crate::background::Background;
use crate::fetch::Transport;
use shelter_core::cache::hash::compute_cache_key;
use shelter_core::{CacheDb, CacheEntry, CacheNames, RequestDescriptor, Response, Strategy};

/// Runs the caching strategies against one store and one transport.
#[derive(Clone)]
pub struct StrategyExecutor {
    transport: Arc<dyn Transport>,
    db: CacheDb,
    names: CacheNames,
    root_key: String,
    background: Background,
}

impl StrategyExecutor {
    /// `root_url` is the document served to offline navigations that have
    /// no cached entry of their own.
    pub fn new(
        transport: Arc<dyn Transport>, db: CacheDb, names: CacheNames, root_url: &url::Url, background: Background,
    ) -> Self {
        Self { transport, db, names, root_key: compute_cache_key("GET", root_url.as_str()), background }
    }

    /// Run `strategy` for `request`.
    ///
    /// Only a cold stale-while-revalidate whose fetch fails yields `None`.
    pub async fn execute(&self, strategy: Strategy, request: &RequestDescriptor) -> Option<Response> {
        match strategy {
            Strategy::NetworkFirst => Some(self.network_first(request).await),
            Strategy::CacheFirst => Some(self.cache_first(request).await),
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Cross-namespace lookup; store errors count as a miss.
    async fn lookup(&self, request_key: &str) -> Option<CacheEntry> {
        match self.db.match_any(request_key).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Write `entry` into `namespace` without making the caller wait.
    fn store_detached(&self, namespace: &str, entry: CacheEntry) {
        let ns = self.db.open_namespace(namespace);
        self.background.spawn(async move {
            if let Err(e) = ns.put(&entry).await {
                tracing::error!(namespace = ns.name(), url = %entry.url, error = %e, "cache write failed");
            }
        });
    }
}
