//! Preloaded loader data
//!
//! Data fetched ahead of a navigation is kept per (route id, pathname) until
//! it expires. A navigation that finds a fresh entry consumes it instead of
//! calling the loader again.

use crate::route::LoaderData;
use crate::trace_log;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Default freshness window for preloaded data.
pub const DEFAULT_PRELOAD_MAX_AGE: Duration = Duration::from_secs(10);

struct PreloadEntry {
    data: LoaderData,
    expires_at: Instant,
}

#[derive(Default)]
pub(crate) struct PreloadCache {
    entries: HashMap<(String, String), PreloadEntry>,
}

impl PreloadCache {
    pub fn insert(&mut self, route_id: &str, pathname: &str, data: LoaderData, max_age: Duration) {
        trace_log!("preloaded '{}' for {:?}", route_id, max_age);
        self.entries.insert(
            (route_id.to_string(), pathname.to_string()),
            PreloadEntry {
                data,
                expires_at: Instant::now() + max_age,
            },
        );
    }

    /// Remove and return the entry if it is still fresh
    pub fn take_fresh(&mut self, route_id: &str, pathname: &str) -> Option<LoaderData> {
        let entry = self
            .entries
            .remove(&(route_id.to_string(), pathname.to_string()))?;
        (Instant::now() < entry.expires_at).then_some(entry.data)
    }

    /// Clone the entry if it is still fresh, leaving it cached
    pub fn get_fresh(&self, route_id: &str, pathname: &str) -> Option<LoaderData> {
        self.entries
            .get(&(route_id.to_string(), pathname.to_string()))
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.data.clone())
    }

    /// Drop every expired entry
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
