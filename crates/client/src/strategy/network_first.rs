use super::StrategyExecutor;
use shelter_core::{CacheEntry, RequestDescriptor, Response};

impl StrategyExecutor {
    /// Network first, then cache, then a synthesized `503`.
    ///
    /// Suspension points: the network fetch, then (on failure) up to two
    /// store lookups. A successful `200` is written to the runtime namespace
    /// in a detached task and returned unmodified.
    pub async fn network_first(&self, request: &RequestDescriptor) -> Response {
        let err = match self.transport.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.store_detached(&self.names.runtime, CacheEntry::capture(request, &response));
                }
                return response;
            }
            Err(err) => err,
        };

        tracing::debug!(url = %request.url, error = %err, "network failed, trying cache");

        if let Some(entry) = self.lookup(&request.cache_key()).await {
            return entry.into();
        }

        if request.navigate
            && let Some(entry) = self.lookup(&self.root_key).await
        {
            tracing::debug!(url = %request.url, "serving cached root to offline navigation");
            return entry.into();
        }

        Response::offline()
    }
}
