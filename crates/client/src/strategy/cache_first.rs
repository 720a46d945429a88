use super::StrategyExecutor;
use shelter_core::{CacheEntry, RequestDescriptor, Response};

impl StrategyExecutor {
    /// Cache first, then network, then a synthesized `404`.
    ///
    /// A hit is served no matter how old it is and no fetch is made. A
    /// fetched `200` is written to the pre-populated namespace in a detached
    /// task.
    pub async fn cache_first(&self, request: &RequestDescriptor) -> Response {
        if let Some(entry) = self.lookup(&request.cache_key()).await {
            tracing::debug!(url = %request.url, "cache hit");
            return entry.into();
        }

        match self.transport.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_detached(&self.names.precache, CacheEntry::capture(request, &response));
                }
                response
            }
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "cache-first fetch failed");
                Response::not_available()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::testing::MockTransport;
    use shelter_core::request::NOT_AVAILABLE_BODY;
    use shelter_core::{RequestDescriptor, Response};

    #[tokio::test]
    async fn test_hit_skips_network() {
        let transport = MockTransport::default().respond("https://app.example/app.css", 200, "new");
        let (executor, transport, db) = executor(transport).await;
        let entry = seed(&db, &names().runtime, "https://app.example/app.css", "old").await;
        let request = RequestDescriptor::get("https://app.example/app.css").unwrap();

        let response = executor.cache_first(&request).await;
        assert_eq!(response, Response::from(entry));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores_in_precache() {
        let transport = MockTransport::default().respond("https://app.example/app.css", 200, "body{}");
        let (executor, transport, db) = executor(transport).await;
        let request = RequestDescriptor::get("https://app.example/app.css").unwrap();

        let response = executor.cache_first(&request).await;
        assert_eq!(response.text(), "body{}");
        assert_eq!(transport.calls(), 1);

        executor.background().settle().await;
        let stored = db
            .open_namespace(&names().precache)
            .get(&request.cache_key())
            .await
            .unwrap();
        assert!(stored.is_some());

        let again = executor.cache_first(&request).await;
        assert_eq!(again.text(), "body{}");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_200_is_not_cached() {
        let transport = MockTransport::default().respond("https://app.example/app.css", 404, "missing");
        let (executor, _, db) = executor(transport).await;
        let request = RequestDescriptor::get("https://app.example/app.css").unwrap();

        let response = executor.cache_first(&request).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.text(), "missing");

        executor.background().settle().await;
        assert!(db.match_any(&request.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_network_failure_synthesizes_404() {
        let (executor, _, _) = executor(MockTransport::offline()).await;
        let request = RequestDescriptor::get("https://app.example/app.css").unwrap();

        let response = executor.cache_first(&request).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.text(), NOT_AVAILABLE_BODY);
    }
}
