//! Provider fallback with a bounded same-provider retry.

use astra_core::RawElement;

use crate::client::PlaceProvider;
use crate::endpoint::ProviderEndpoint;
use crate::error::{AttemptError, FallbackError};
use crate::retry::RetryPolicy;

/// Elements from the first provider that answered.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSuccess {
    pub provider: String,
    /// Attempts spent on the winning provider (1 or 2).
    pub attempts: u32,
    pub elements: Vec<RawElement>,
}

/// Walks a fixed, priority-ordered endpoint list until one answers.
///
/// Holds no cache state; degraded-mode handling is up to the caller.
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    endpoints: Vec<ProviderEndpoint>,
    retry: RetryPolicy,
}

impl FallbackOrchestrator {
    pub fn new(endpoints: Vec<ProviderEndpoint>, retry: RetryPolicy) -> Self {
        Self { endpoints, retry }
    }

    /// Run `query` against each endpoint in order.
    ///
    /// Timeouts and transport failures are retried once on the same endpoint
    /// after the policy delay; protocol and parse failures move straight on
    /// to the next endpoint. The first success ends the walk.
    pub async fn run<P: PlaceProvider>(
        &self,
        provider: &P,
        query: &str,
    ) -> Result<ProviderSuccess, FallbackError> {
        let mut last_failure: Option<(String, u32, AttemptError)> = None;

        for endpoint in &self.endpoints {
            let mut attempts = 0u32;
            loop {
                attempts += 1;
                match provider.attempt(endpoint, query).await {
                    Ok(elements) => {
                        tracing::info!(
                            "Provider {} returned {} elements (attempt {})",
                            endpoint.id,
                            elements.len(),
                            attempts
                        );
                        return Ok(ProviderSuccess {
                            provider: endpoint.id.clone(),
                            attempts,
                            elements,
                        });
                    }
                    Err(err) => {
                        let retry = err.is_transient() && attempts < self.retry.max_attempts();
                        tracing::warn!(
                            "Provider {} attempt {} failed ({}): {}",
                            endpoint.id,
                            attempts,
                            err.kind(),
                            err
                        );
                        last_failure = Some((endpoint.id.clone(), attempts, err));
                        if !retry {
                            break;
                        }
                        let delay = self.retry.next_delay();
                        tracing::debug!("Retrying {} in {:?}", endpoint.id, delay);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        match last_failure {
            Some((provider, attempts, source)) => Err(FallbackError::Exhausted {
                provider,
                attempts,
                source,
            }),
            None => Err(FallbackError::NoProviders),
        }
    }
}
