//! Nearby safe-places pipeline.
//!
//! query builder -> fallback orchestrator -> normalizer -> cache update,
//! with the degraded-mode cache answering when every provider fails.

use astra_core::{build_overpass_query, normalize_elements, InputError, SearchRequest, SearchResult};
use astra_osm::{FallbackOrchestrator, OverpassClient, PlaceProvider};
use std::sync::Arc;

use crate::cache::DegradedCache;

pub struct NearbyService<P = OverpassClient> {
    provider: P,
    orchestrator: FallbackOrchestrator,
    cache: DegradedCache,
    query_timeout_s: u32,
    max_radius_m: u32,
}

impl<P: PlaceProvider> NearbyService<P> {
    pub fn new(
        provider: P,
        orchestrator: FallbackOrchestrator,
        query_timeout_s: u32,
        max_radius_m: u32,
    ) -> Self {
        Self {
            provider,
            orchestrator,
            cache: DegradedCache::new(),
            query_timeout_s,
            max_radius_m,
        }
    }

    pub fn cache(&self) -> &DegradedCache {
        &self.cache
    }

    /// Run one search. Only input errors are returned as `Err`; provider
    /// failures always degrade to a cached or "no data yet" result.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult, InputError> {
        request.ensure_radius_within(self.max_radius_m)?;

        let query = build_overpass_query(request, self.query_timeout_s);
        match self.orchestrator.run(&self.provider, &query).await {
            Ok(success) => {
                let places = normalize_elements(&success.elements);
                tracing::info!(
                    "Nearby search via {}: {} of {} elements usable",
                    success.provider,
                    places.len(),
                    success.elements.len()
                );
                let result = SearchResult::live(places);
                self.cache.store(&result);
                Ok(result)
            }
            Err(err) => {
                tracing::warn!("Nearby search degraded: {}", err);
                Ok(self.cache.fallback(&err))
            }
        }
    }
}

impl<P: PlaceProvider + 'static> NearbyService<P> {
    /// Run the search on its own task so that a caller hanging up does not
    /// cancel an in-flight provider attempt or the cache update.
    pub async fn search_detached(
        self: &Arc<Self>,
        request: SearchRequest,
    ) -> Result<SearchResult, InputError> {
        let service = Arc::clone(self);
        match tokio::spawn(async move { service.search(&request).await }).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!("Nearby search task failed: {}", err);
                Ok(self.cache.fallback(&"search task failed"))
            }
        }
    }
}
