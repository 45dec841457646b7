use std::sync::Arc;
use std::time::Duration;

use freightcast_models::HistoricalQuote;
use moka::future::Cache;

/// A catalog snapshot shared between concurrent estimations.
pub type Snapshot = Arc<Vec<HistoricalQuote>>;

/// In-memory snapshot cache backed by moka.
///
/// Holds whole catalog snapshots keyed by table name. A snapshot is
/// replaced atomically, so readers never observe a half-patched catalog.
/// Entries are evicted after TTL.
pub struct CatalogCache {
    inner: Cache<String, Snapshot>,
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(16).time_to_live(ttl).build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Snapshot> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, snapshot: Snapshot) {
        self.inner.insert(key, snapshot).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}
