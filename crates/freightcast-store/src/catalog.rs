use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use freightcast_models::store_schema::QUOTES_TABLE;
use freightcast_models::{IssuedQuote, NewQuote};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::memory::{CatalogCache, Snapshot};
use crate::store::{CatalogLoad, DistanceUpdate, QuoteStore};

/// Distinct values present in the catalog, sorted. These are the choices a
/// request can make that have any chance of matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    pub cargo_types: Vec<String>,
    pub modalities: Vec<String>,
}

/// Outcome of a distance write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceWrite {
    pub updated: usize,
    /// Write generation right after this write.
    pub generation: u64,
}

/// Read-through catalog: serves snapshots from moka, falls back to the store.
///
/// Every write that changes historical quotes goes through here and bumps a
/// write generation. A snapshot is only installed in the cache if no write
/// landed between reading it and installing it.
///
/// Store access is synchronized via `Mutex` since `rusqlite::Connection` is not `Sync`.
pub struct Catalog {
    memory: CatalogCache,
    store: Mutex<Box<dyn QuoteStore>>,
    generation: AtomicU64,
}

impl Catalog {
    pub fn new(store: Box<dyn QuoteStore>, ttl: Duration) -> Self {
        Self {
            memory: CatalogCache::new(ttl),
            store: Mutex::new(store),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn QuoteStore>>, StoreError> {
        self.store
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("store mutex poisoned: {e}")))
    }

    /// Number of writes applied through this catalog.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The current catalog snapshot. Loads from the store on a cache miss.
    pub async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        if let Some(snapshot) = self.memory.get(QUOTES_TABLE).await {
            return Ok(snapshot);
        }

        let (load, generation) = self.load_versioned()?;
        let snapshot = Arc::new(load.quotes);
        self.install(snapshot.clone(), generation).await;
        Ok(snapshot)
    }

    /// Read straight from the store, bypassing and not touching the cache.
    pub fn load_uncached(&self) -> Result<CatalogLoad, StoreError> {
        Ok(self.load_versioned()?.0)
    }

    /// Like [`Catalog::load_uncached`], also returning the write generation
    /// the load reflects.
    pub fn load_versioned(&self) -> Result<(CatalogLoad, u64), StoreError> {
        let store = self.lock()?;
        let load = store.load_quotes()?;
        // Writes bump the generation while holding the lock
        let generation = self.generation();
        drop(store);

        if load.skipped > 0 {
            info!(
                loaded = load.quotes.len(),
                skipped = load.skipped,
                "Catalog loaded with malformed rows skipped"
            );
        }
        Ok((load, generation))
    }

    /// Install a snapshot built outside the cache, e.g. a backfill-patched
    /// catalog read at `generation`. Returns false, leaving the cache empty,
    /// if a write landed since.
    pub async fn replace_snapshot(&self, snapshot: Snapshot, generation: u64) -> bool {
        self.install(snapshot, generation).await
    }

    async fn install(&self, snapshot: Snapshot, generation: u64) -> bool {
        if self.generation() != generation {
            debug!(generation, "Discarding snapshot older than the latest write");
            self.invalidate().await;
            return false;
        }
        self.memory.insert(QUOTES_TABLE.to_string(), snapshot).await;
        // A write may have bumped the generation and invalidated between the
        // check and the insert; its invalidate could have run first.
        if self.generation() != generation {
            self.invalidate().await;
            return false;
        }
        true
    }

    pub async fn invalidate(&self) {
        debug!("Catalog snapshot invalidated");
        self.memory.invalidate(QUOTES_TABLE).await;
    }

    /// Write resolved distances back in one batch, then drop the cached snapshot.
    pub async fn write_distances(
        &self,
        updates: &[DistanceUpdate],
    ) -> Result<DistanceWrite, StoreError> {
        let write = {
            let mut store = self.lock()?;
            let updated = store.update_distances(updates)?;
            DistanceWrite {
                updated,
                generation: self.bump(),
            }
        };
        self.invalidate().await;
        Ok(write)
    }

    /// Record new historical quotes, then drop the cached snapshot.
    pub async fn record_quotes(&self, quotes: &[NewQuote]) -> Result<Vec<i64>, StoreError> {
        let ids = {
            let mut store = self.lock()?;
            let ids = store.insert_quotes(quotes)?;
            self.bump();
            ids
        };
        info!(count = ids.len(), "Recorded historical quotes");
        self.invalidate().await;
        Ok(ids)
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_issued(&self, issued: &IssuedQuote) -> Result<(), StoreError> {
        self.lock()?.insert_issued(issued)
    }

    pub fn recent_issued(&self, limit: usize) -> Result<Vec<IssuedQuote>, StoreError> {
        self.lock()?.recent_issued(limit)
    }

    /// Distinct origins, destinations, cargo types and modalities in the catalog.
    pub async fn options(&self) -> Result<RequestOptions, StoreError> {
        let snapshot = self.snapshot().await?;
        let mut origins = BTreeSet::new();
        let mut destinations = BTreeSet::new();
        let mut cargo_types = BTreeSet::new();
        let mut modalities = BTreeSet::new();
        for quote in snapshot.iter() {
            origins.insert(quote.origin_city.clone());
            destinations.insert(quote.destination_city.clone());
            cargo_types.insert(quote.cargo_type.clone());
            modalities.insert(quote.modality.clone());
        }
        Ok(RequestOptions {
            origins: origins.into_iter().collect(),
            destinations: destinations.into_iter().collect(),
            cargo_types: cargo_types.into_iter().collect(),
            modalities: modalities.into_iter().collect(),
        })
    }
}
