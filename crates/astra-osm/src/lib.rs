//! Outbound map-data and routing clients.
//!
//! The Overpass side is split in three layers: [`OverpassClient`] makes one
//! attempt against one endpoint, [`FallbackOrchestrator`] walks the endpoint
//! list with a bounded retry, and callers decide what to do when every
//! endpoint is exhausted.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod osrm;
pub mod retry;

pub use client::{OverpassClient, PlaceProvider};
pub use endpoint::{ProviderEndpoint, DEFAULT_OVERPASS_URLS};
pub use error::{AttemptError, FallbackError, RouteError};
pub use fallback::{FallbackOrchestrator, ProviderSuccess};
pub use osrm::{RouteClient, RouteRequest, RouteSummary};
pub use retry::RetryPolicy;
