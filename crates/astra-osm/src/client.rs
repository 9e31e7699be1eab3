//! Single-attempt Overpass client.

use astra_core::RawElement;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::endpoint::ProviderEndpoint;
use crate::error::AttemptError;

/// Longest provider error body kept in an [`AttemptError::Protocol`].
const ERROR_BODY_LIMIT: usize = 200;

/// Something that can run one query attempt against one endpoint.
///
/// Implementations must not retry; that policy belongs to the orchestrator.
pub trait PlaceProvider: Send + Sync {
    fn attempt(
        &self,
        endpoint: &ProviderEndpoint,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawElement>, AttemptError>> + Send;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<RawElement>,
    #[serde(default)]
    remark: Option<String>,
}

/// HTTP client for Overpass interpreter endpoints.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
}

impl OverpassClient {
    /// Build a client sending the given descriptive user agent.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl PlaceProvider for OverpassClient {
    async fn attempt(
        &self,
        endpoint: &ProviderEndpoint,
        query: &str,
    ) -> Result<Vec<RawElement>, AttemptError> {
        let timeout = endpoint.attempt_timeout;
        tracing::debug!("[PROVIDER] Querying {} ({})", endpoint.id, endpoint.url);

        let response = self
            .client
            .post(&endpoint.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query)])
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| classify_request_error(err, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Protocol {
                status: status.as_u16(),
                body: truncate(body.trim(), ERROR_BODY_LIMIT),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| classify_request_error(err, timeout))?;

        let parsed: OverpassResponse = serde_json::from_slice(&bytes)
            .map_err(|err| AttemptError::Parse(err.to_string()))?;

        if let Some(remark) = parsed.remark.as_deref() {
            tracing::warn!("Provider {} remark: {}", endpoint.id, remark);
        }

        Ok(parsed.elements)
    }
}

fn classify_request_error(err: reqwest::Error, timeout: Duration) -> AttemptError {
    if err.is_timeout() {
        AttemptError::Timeout(timeout)
    } else {
        AttemptError::Transport(err.to_string())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push('…');
    cut
}
