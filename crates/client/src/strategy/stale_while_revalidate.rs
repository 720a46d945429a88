use tokio::sync::oneshot;

use super::StrategyExecutor;
use shelter_core::{CacheEntry, RequestDescriptor, Response};

impl StrategyExecutor {
    /// Serve the cached entry immediately and refresh it in the background.
    ///
    /// The refresh fetch always runs as a detached task. With a cache hit
    /// the caller never waits on it; on a cold cache the caller waits for
    /// its outcome, which is `None` if the fetch failed.
    pub async fn stale_while_revalidate(&self, request: &RequestDescriptor) -> Option<Response> {
        let cached = self.lookup(&request.cache_key()).await;

        let (tx, rx) = oneshot::channel();
        let refresher = self.clone();
        let target = request.clone();
        self.background.spawn(async move {
            let outcome = refresher.refresh(&target).await;
            // Nobody listens when the cached entry was served.
            let _ = tx.send(outcome);
        });

        match cached {
            Some(entry) => {
                tracing::debug!(url = %request.url, "serving stale entry, refreshing in background");
                Some(entry.into())
            }
            None => rx.await.ok().flatten(),
        }
    }

    async fn refresh(&self, request: &RequestDescriptor) -> Option<Response> {
        match self.transport.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_detached(&self.names.runtime, CacheEntry::capture(request, &response));
                }
                Some(response)
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "background refresh failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::testing::MockTransport;
    use bytes::Bytes;
    use shelter_core::{RequestDescriptor, Response};

    #[tokio::test]
    async fn test_hit_returns_without_waiting_for_network() {
        let transport = MockTransport::gated().respond("https://app.example/cover.jpg", 200, "new");
        let (executor, transport, db) = executor(transport).await;
        let entry = seed(&db, &names().precache, "https://app.example/cover.jpg", "old").await;
        let request = RequestDescriptor::get("https://app.example/cover.jpg").unwrap();

        let response = executor.stale_while_revalidate(&request).await;
        assert_eq!(response, Some(Response::from(entry)));
        assert_eq!(transport.completed(), 0);

        transport.release(1);
        executor.background().settle().await;
        assert_eq!(transport.completed(), 1);

        let refreshed = db
            .open_namespace(&names().runtime)
            .get(&request.cache_key())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.body, Bytes::from("new"));
    }

    #[tokio::test]
    async fn test_miss_waits_for_fetch() {
        let transport = MockTransport::default().respond("https://app.example/cover.jpg", 200, "fresh");
        let (executor, transport, db) = executor(transport).await;
        let request = RequestDescriptor::get("https://app.example/cover.jpg").unwrap();

        let response = executor.stale_while_revalidate(&request).await.unwrap();
        assert_eq!(response.text(), "fresh");
        assert_eq!(transport.calls(), 1);

        executor.background().settle().await;
        assert!(db.match_any(&request.cache_key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_miss_with_failed_fetch_is_none() {
        let (executor, _, _) = executor(MockTransport::offline()).await;
        let request = RequestDescriptor::get("https://app.example/cover.jpg").unwrap();

        assert_eq!(executor.stale_while_revalidate(&request).await, None);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_entry() {
        let (executor, _, db) = executor(MockTransport::offline()).await;
        let entry = seed(&db, &names().runtime, "https://app.example/cover.jpg", "old").await;
        let request = RequestDescriptor::get("https://app.example/cover.jpg").unwrap();

        let response = executor.stale_while_revalidate(&request).await;
        assert_eq!(response, Some(Response::from(entry.clone())));

        executor.background().settle().await;
        let still = db.match_any(&request.cache_key()).await.unwrap().unwrap();
        assert_eq!(still, entry);
    }
}
