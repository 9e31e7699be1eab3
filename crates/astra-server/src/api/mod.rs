//! HTTP API for the Astra server.

pub mod request_id;
mod routes;

use crate::config::Config;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use routes::{NearbyQuery, NearbyResponse, RouteQuery, RouteResponse};

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}

/// Permissive unless specific origins are configured.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}
