use astra_core::InputError;
use std::time::Duration;
use thiserror::Error;

/// Why a single provider attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Parse(String),
}

impl AttemptError {
    /// Timeouts and transport faults may clear up on their own; a bad status
    /// or an unparsable body will not.
    pub fn is_transient(&self) -> bool {
        matches!(self, AttemptError::Timeout(_) | AttemptError::Transport(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Timeout(_) => "timeout",
            AttemptError::Transport(_) => "transport",
            AttemptError::Protocol { .. } => "protocol",
            AttemptError::Parse(_) => "parse",
        }
    }
}

/// Every configured provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FallbackError {
    #[error("no providers configured")]
    NoProviders,

    #[error("all providers failed; last was {provider} after {attempts} attempt(s): {source}")]
    Exhausted {
        provider: String,
        attempts: u32,
        #[source]
        source: AttemptError,
    },
}

impl FallbackError {
    /// The most recent attempt failure, if any attempt was made.
    pub fn last_failure(&self) -> Option<&AttemptError> {
        match self {
            FallbackError::NoProviders => None,
            FallbackError::Exhausted { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("OSRM request failed: {0}")]
    Request(String),

    /// Provider answered but had no usable route; carries its body.
    #[error("No route found")]
    NoRoute(serde_json::Value),
}
