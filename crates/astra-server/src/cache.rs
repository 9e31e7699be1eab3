//! Last-known-good cache for nearby searches.
//!
//! Holds one slot: the most recent successful [`SearchResult`]. It is served
//! when every live provider fails, so the mobile client always has something
//! to render.

use astra_core::SearchResult;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};

/// Immutable view of the slot at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub result: SearchResult,
    /// `None` until the first successful search.
    pub stored_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    fn cold() -> Self {
        Self {
            result: SearchResult::no_data_yet(),
            stored_at: None,
        }
    }

    pub fn is_cold(&self) -> bool {
        self.stored_at.is_none()
    }
}

/// Single-slot store. Writers swap in a whole new snapshot under the lock, so
/// readers never see a half-written entry.
#[derive(Debug)]
pub struct DegradedCache {
    slot: Mutex<Arc<CacheSnapshot>>,
}

impl Default for DegradedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradedCache {
    /// Start cold, holding the "no data yet" sentinel.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Arc::new(CacheSnapshot::cold())),
        }
    }

    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.lock().clone()
    }

    /// Replace the slot with a successful result. Failed results are refused.
    pub fn store(&self, result: &SearchResult) -> bool {
        if !result.success {
            tracing::debug!("Refusing to cache a failed search result");
            return false;
        }
        let snapshot = Arc::new(CacheSnapshot {
            result: result.clone(),
            stored_at: Some(Utc::now()),
        });
        *self.lock() = snapshot;
        true
    }

    /// Degraded response after every provider failed.
    ///
    /// Copies the cached places and success flag and explains the staleness.
    /// A cold cache yields an empty, unsuccessful "no data yet" result.
    pub fn fallback(&self, cause: &dyn Display) -> SearchResult {
        let snapshot = self.snapshot();
        match snapshot.stored_at {
            Some(stored_at) => {
                tracing::warn!(
                    "Serving {} cached places from {}",
                    snapshot.result.count(),
                    stored_at
                );
                SearchResult {
                    success: snapshot.result.success,
                    places: snapshot.result.places.clone(),
                    message: format!(
                        "Live data unavailable; showing cached results from {} ({})",
                        stored_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                        cause
                    ),
                }
            }
            None => {
                tracing::warn!("No cached nearby data to fall back on");
                SearchResult {
                    success: false,
                    places: Vec::new(),
                    message: format!("{} ({})", SearchResult::no_data_yet().message, cause),
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Arc<CacheSnapshot>> {
        // The slot is always a complete snapshot, so a poisoned lock is still usable.
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
