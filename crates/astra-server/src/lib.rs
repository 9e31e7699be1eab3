//! Shared library surface for the Astra server and its tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod nearby;
pub mod state;
