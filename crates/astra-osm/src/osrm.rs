//! OSRM route lookups.
//!
//! Single provider, single attempt: routing has no fallback.

use astra_core::{GeoPoint, InputError, RoutePoint};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::RouteError;

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_PROFILE: &str = "foot";

/// A validated route lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub profile: String,
}

impl RouteRequest {
    pub fn new(start: GeoPoint, end: GeoPoint, profile: &str) -> Result<Self, InputError> {
        let profile = profile.trim();
        let valid = !profile.is_empty()
            && profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(InputError::InvalidProfile(profile.to_string()));
        }
        Ok(Self {
            start,
            end,
            profile: profile.to_string(),
        })
    }

    /// `lon,lat;lon,lat` path segment.
    fn coordinates(&self) -> String {
        format!(
            "{},{};{},{}",
            self.start.lon(),
            self.start.lat(),
            self.end.lon(),
            self.end.lat()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
    pub points: Vec<RoutePoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<Vec<f64>>,
}

/// HTTP client for an OSRM-compatible routing server.
#[derive(Debug, Clone)]
pub struct RouteClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RouteClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Fetch one route and decode its GeoJSON geometry.
    pub async fn fetch(&self, request: &RouteRequest) -> Result<RouteSummary, RouteError> {
        let url = format!(
            "{}/route/v1/{}/{}",
            self.base_url.trim_end_matches('/'),
            request.profile,
            request.coordinates()
        );
        tracing::debug!("[ROUTE] Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("geometries", "geojson"),
                ("steps", "false"),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| RouteError::Request(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| RouteError::Request(err.to_string()))?;

        let body: Value = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(RouteError::Request(format!("HTTP {}", status)));
            }
            Err(err) => return Err(RouteError::Request(err.to_string())),
        };

        if !status.is_success() && body.get("code").is_none() {
            return Err(RouteError::Request(format!("HTTP {}", status)));
        }

        decode_route(body)
    }
}

/// Turn an OSRM response body into a route summary.
fn decode_route(body: Value) -> Result<RouteSummary, RouteError> {
    let code_ok = body.get("code").and_then(Value::as_str) == Some("Ok");
    let first_route = body
        .get("routes")
        .and_then(Value::as_array)
        .and_then(|routes| routes.first())
        .cloned();

    let route = match (code_ok, first_route) {
        (true, Some(route)) => route,
        _ => return Err(RouteError::NoRoute(body)),
    };

    let route: OsrmRoute = match serde_json::from_value(route) {
        Ok(route) => route,
        Err(err) => {
            tracing::warn!("OSRM route had unexpected shape: {}", err);
            return Err(RouteError::NoRoute(body));
        }
    };

    let points = route
        .geometry
        .coordinates
        .iter()
        .filter_map(|pair| match pair.as_slice() {
            [lon, lat, ..] => Some(RoutePoint {
                lat: *lat,
                lon: *lon,
            }),
            _ => None,
        })
        .collect();

    Ok(RouteSummary {
        distance_m: route.distance,
        duration_s: route.duration,
        points,
    })
}
