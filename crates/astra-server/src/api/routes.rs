//! REST API routes.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::request_id;
use crate::state::AppState;
use astra_core::{
    analyze_text, Analysis, Category, GeoPoint, InputError, PlaceRecord, RoutePoint,
    SearchRequest, SearchResult,
};
use astra_osm::osrm::DEFAULT_PROFILE;
use astra_osm::{RouteError, RouteRequest};

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/nearby", get(nearby))
        .route("/route", get(route))
        .layer(middleware::from_fn(request_id::ensure_request_id))
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    /// Defaults to the configured radius (3000 m)
    pub radius_m: Option<i64>,
    /// Comma-separated subset of `police,hospital`
    pub categories: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub ok: bool,
    pub count: usize,
    pub items: Vec<PlaceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NearbyResponse {
    fn rejected(err: &InputError) -> Self {
        Self {
            ok: false,
            count: 0,
            items: Vec::new(),
            message: Some(err.to_string()),
        }
    }
}

impl From<SearchResult> for NearbyResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            ok: result.success,
            count: result.places.len(),
            items: result.places,
            message: Some(result.message).filter(|m| !m.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub profile: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct RouteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
    pub points: Vec<RoutePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl RouteResponse {
    fn failed(err: RouteError) -> Self {
        let message = Some(err.to_string());
        match err {
            RouteError::NoRoute(raw) => Self {
                message,
                raw: Some(raw),
                ..Self::default()
            },
            _ => Self {
                message,
                ..Self::default()
            },
        }
    }
}

// === Handlers ===

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze(Json(req): Json<AnalyzeRequest>) -> Json<Analysis> {
    let text = req.text.unwrap_or_default();
    Json(analyze_text(&text))
}

/// Turn a query-string extraction failure into an input error so that
/// handlers can answer with their own JSON shape instead of axum's plain text.
fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, InputError> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| InputError::MalformedQuery(rejection.body_text()))
}

async fn nearby(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> (StatusCode, Json<NearbyResponse>) {
    let query = match parse_query(query) {
        Ok(query) => query,
        Err(err) => {
            tracing::info!("Rejected nearby request: {}", err);
            return (StatusCode::BAD_REQUEST, Json(NearbyResponse::rejected(&err)));
        }
    };
    let radius_m = query
        .radius_m
        .unwrap_or(state.config().default_radius_m);

    let request = match build_search_request(&query, radius_m) {
        Ok(request) => request,
        Err(err) => {
            tracing::info!("Rejected nearby request: {}", err);
            return (StatusCode::BAD_REQUEST, Json(NearbyResponse::rejected(&err)));
        }
    };

    match state.nearby().search_detached(request).await {
        Ok(result) => (StatusCode::OK, Json(result.into())),
        Err(err) => {
            tracing::info!("Rejected nearby request: {}", err);
            (StatusCode::BAD_REQUEST, Json(NearbyResponse::rejected(&err)))
        }
    }
}

fn build_search_request(query: &NearbyQuery, radius_m: i64) -> Result<SearchRequest, InputError> {
    let center = GeoPoint::new(query.lat, query.lon)?;
    let categories = match query.categories.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Category>)
            .collect::<Result<Vec<_>, _>>()?,
        _ => Category::SEARCHABLE.to_vec(),
    };
    SearchRequest::new(center, radius_m, categories)
}

async fn route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RouteQuery>, QueryRejection>,
) -> (StatusCode, Json<RouteResponse>) {
    let request = match parse_query(query).and_then(|query| build_route_request(&query)) {
        Ok(request) => request,
        Err(err) => {
            tracing::info!("Rejected route request: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                Json(RouteResponse::failed(RouteError::Input(err))),
            );
        }
    };

    match state.routes().fetch(&request).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(RouteResponse {
                ok: true,
                distance_m: summary.distance_m,
                duration_s: summary.duration_s,
                points: summary.points,
                ..RouteResponse::default()
            }),
        ),
        Err(err) => {
            tracing::warn!("Route lookup failed: {}", err);
            (StatusCode::OK, Json(RouteResponse::failed(err)))
        }
    }
}

fn build_route_request(query: &RouteQuery) -> Result<RouteRequest, InputError> {
    let start = GeoPoint::new(query.start_lat, query.start_lon)?;
    let end = GeoPoint::new(query.end_lat, query.end_lon)?;
    let profile = query.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
    RouteRequest::new(start, end, profile)
}
