//! Static provider endpoint descriptions.

use reqwest::Url;
use std::time::Duration;

/// Public Overpass mirrors, most reliable first.
pub const DEFAULT_OVERPASS_URLS: [&str; 3] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.openstreetmap.ru/api/interpreter",
];

/// One provider the orchestrator may query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub id: String,
    pub url: String,
    pub attempt_timeout: Duration,
}

impl ProviderEndpoint {
    /// Describe an endpoint, naming it after the URL host.
    pub fn new(url: impl Into<String>, attempt_timeout: Duration) -> Self {
        let url = url.into();
        let id = Url::parse(&url)
            .ok()
            .and_then(|parsed| {
                let host = parsed.host_str()?.to_string();
                Some(match parsed.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host,
                })
            })
            .unwrap_or_else(|| url.clone());
        Self {
            id,
            url,
            attempt_timeout,
        }
    }
}
