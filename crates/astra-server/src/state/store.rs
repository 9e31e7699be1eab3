//! Shared application state.

use anyhow::{Context, Result};
use astra_osm::{FallbackOrchestrator, OverpassClient, RetryPolicy, RouteClient};
use std::sync::Arc;

use crate::config::Config;
use crate::nearby::NearbyService;

/// Everything handlers need. Built once at startup; the degraded-mode cache
/// inside the nearby service is the only mutable part.
pub struct AppState {
    config: Config,
    nearby: Arc<NearbyService>,
    routes: RouteClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let endpoints = config.overpass_endpoints();
        if endpoints.is_empty() {
            anyhow::bail!("no Overpass endpoints configured");
        }
        for endpoint in &endpoints {
            tracing::info!(
                "Overpass provider {} ({}), timeout {:?}",
                endpoint.id,
                endpoint.url,
                endpoint.attempt_timeout
            );
        }

        let overpass = OverpassClient::new(&config.user_agent)
            .context("failed to build Overpass HTTP client")?;
        let orchestrator =
            FallbackOrchestrator::new(endpoints, RetryPolicy::new(config.retry_backoff()));
        let nearby = NearbyService::new(
            overpass,
            orchestrator,
            config.overpass_query_timeout_s,
            config.max_radius_m,
        );

        let routes = RouteClient::new(
            config.osrm_url.clone(),
            &config.user_agent,
            config.osrm_timeout(),
        )
        .context("failed to build OSRM HTTP client")?;

        Ok(Self {
            config,
            nearby: Arc::new(nearby),
            routes,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn nearby(&self) -> &Arc<NearbyService> {
        &self.nearby
    }

    pub fn routes(&self) -> &RouteClient {
        &self.routes
    }
}
