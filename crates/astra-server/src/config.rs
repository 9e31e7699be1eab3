//! Server configuration from environment.

use astra_osm::endpoint::{ProviderEndpoint, DEFAULT_OVERPASS_URLS};
use astra_osm::osrm::DEFAULT_OSRM_URL;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Astra-FYP/1.0 (Safety App FYP)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Overpass interpreter URLs in priority order.
    pub overpass_urls: Vec<String>,
    pub overpass_timeout_s: u64,
    /// `[timeout:N]` budget sent inside the query.
    pub overpass_query_timeout_s: u32,
    pub retry_backoff_ms: u64,
    pub osrm_url: String,
    pub osrm_timeout_s: u64,
    pub user_agent: String,
    pub default_radius_m: i64,
    pub max_radius_m: u32,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            overpass_urls: DEFAULT_OVERPASS_URLS.iter().map(|s| s.to_string()).collect(),
            overpass_timeout_s: 35,
            overpass_query_timeout_s: 25,
            retry_backoff_ms: 600,
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            osrm_timeout_s: 20,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_radius_m: 3000,
            max_radius_m: 20_000,
            cors_origins: Vec::new(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_env::<u16>("ASTRA_PORT").unwrap_or(defaults.server_port),
            overpass_urls: list_env("ASTRA_OVERPASS_URLS").unwrap_or(defaults.overpass_urls),
            overpass_timeout_s: parse_env::<u64>("ASTRA_OVERPASS_TIMEOUT_S")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.overpass_timeout_s),
            overpass_query_timeout_s: parse_env::<u32>("ASTRA_OVERPASS_QUERY_TIMEOUT_S")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.overpass_query_timeout_s),
            retry_backoff_ms: parse_env::<u64>("ASTRA_RETRY_BACKOFF_MS")
                .unwrap_or(defaults.retry_backoff_ms),
            osrm_url: env::var("ASTRA_OSRM_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.osrm_url),
            osrm_timeout_s: parse_env::<u64>("ASTRA_OSRM_TIMEOUT_S")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.osrm_timeout_s),
            user_agent: env::var("ASTRA_USER_AGENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            default_radius_m: parse_env::<i64>("ASTRA_DEFAULT_RADIUS_M")
                .unwrap_or(defaults.default_radius_m),
            max_radius_m: parse_env::<u32>("ASTRA_MAX_RADIUS_M").unwrap_or(defaults.max_radius_m),
            cors_origins: list_env("ASTRA_CORS_ORIGINS").unwrap_or_default(),
            log_format: match env::var("ASTRA_LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    /// Overpass endpoints, built once at startup.
    pub fn overpass_endpoints(&self) -> Vec<ProviderEndpoint> {
        let timeout = Duration::from_secs(self.overpass_timeout_s);
        self.overpass_urls
            .iter()
            .map(|url| ProviderEndpoint::new(url.as_str(), timeout))
            .collect()
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn osrm_timeout(&self) -> Duration {
        Duration::from_secs(self.osrm_timeout_s)
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Comma-separated list; `None` when unset or empty.
fn list_env(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
