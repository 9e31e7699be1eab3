//! Astra CLI - command line tools for poking a running Astra server.
//!
//! - astra-probe: call /health, /analyze, /nearby and /route and print the JSON

pub mod probe;

pub use probe::ProbeClient;
