//! One pass of distance backfill over the historical catalog.

use std::collections::HashMap;
use std::sync::Arc;

use freightcast_store::{Catalog, DistanceUpdate, Snapshot};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::distance::DistanceResolver;
use crate::error::BackfillError;

/// What a backfill pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// Quotes with no distance (or a zero placeholder) at the start of the pass.
    pub candidates: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Rows the store confirmed updating.
    pub written: usize,
    /// The batched write failed; the patched catalog was still installed in memory.
    pub write_failed: bool,
    pub cancelled: bool,
    /// False when another write landed during the pass; the cache was then
    /// dropped instead of primed.
    pub snapshot_installed: bool,
}

/// Fill in missing distances, persist them in one batch and install the
/// patched catalog as the current snapshot.
///
/// The catalog is read once, straight from the store. If anything else
/// wrote to the catalog in the meantime the patched copy is stale, so the
/// cache is dropped and the next reader loads fresh. Each distinct
/// origin/destination pair is resolved at most once per pass. Cancellation
/// stops resolving but still keeps whatever was resolved so far.
pub async fn run_backfill(
    catalog: &Catalog,
    resolver: &DistanceResolver,
    cancel: &CancellationToken,
) -> Result<(BackfillReport, Snapshot), BackfillError> {
    let (load, read_generation) = catalog.load_versioned()?;
    let mut quotes = load.quotes;
    let mut report = BackfillReport::default();
    let mut resolved_pairs: HashMap<(String, String), Option<f64>> = HashMap::new();
    let mut updates = Vec::new();

    let candidates: Vec<usize> = quotes
        .iter()
        .enumerate()
        .filter(|(_, quote)| quote.needs_distance())
        .map(|(index, _)| index)
        .collect();
    report.candidates = candidates.len();
    info!(candidates = report.candidates, "Distance backfill starting");

    for index in candidates {
        let pair = (
            quotes[index].origin_city.clone(),
            quotes[index].destination_city.clone(),
        );

        let distance = match resolved_pairs.get(&pair) {
            Some(known) => *known,
            None => {
                let resolved = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("Distance backfill cancelled");
                        report.cancelled = true;
                        break;
                    }
                    km = resolver.resolve(&pair.0, &pair.1) => km,
                };
                resolved_pairs.insert(pair, resolved);
                resolved
            }
        };

        match distance {
            Some(km) => {
                let quote = &mut quotes[index];
                quote.distance_km = Some(km);
                updates.push(DistanceUpdate {
                    quote_id: quote.quote_id,
                    distance_km: km,
                });
                report.resolved += 1;
            }
            None => report.unresolved += 1,
        }
    }

    // Generation the patched copy matches once our own write is counted
    let mut patched_generation = read_generation;
    if !updates.is_empty() {
        match catalog.write_distances(&updates).await {
            Ok(write) => {
                report.written = write.updated;
                if write.generation == read_generation + 1 {
                    patched_generation = write.generation;
                }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    pending = updates.len(),
                    "Failed to persist distances; keeping them in memory only"
                );
                report.write_failed = true;
            }
        }
    }

    let snapshot: Snapshot = Arc::new(quotes);
    report.snapshot_installed = catalog
        .replace_snapshot(snapshot.clone(), patched_generation)
        .await;

    info!(
        resolved = report.resolved,
        unresolved = report.unresolved,
        written = report.written,
        snapshot_installed = report.snapshot_installed,
        "Distance backfill finished"
    );
    Ok((report, snapshot))
}
