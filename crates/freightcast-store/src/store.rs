use freightcast_models::{HistoricalQuote, IssuedQuote, NewQuote};

use crate::error::StoreError;

/// Quotes read from the store in one pass.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    pub quotes: Vec<HistoricalQuote>,
    /// Rows dropped because a value, weight, lead time or timestamp was unusable.
    pub skipped: usize,
}

/// A resolved distance to write back onto a stored quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceUpdate {
    pub quote_id: i64,
    pub distance_km: f64,
}

/// Record store holding historical quotes and the issued-quote audit trail.
///
/// `SqliteStore` is the production implementation; tests substitute their own.
pub trait QuoteStore: Send {
    /// Read every historical quote, skipping malformed rows.
    fn load_quotes(&self) -> Result<CatalogLoad, StoreError>;

    /// Write resolved distances in a single batch. Returns rows updated.
    fn update_distances(&mut self, updates: &[DistanceUpdate]) -> Result<usize, StoreError>;

    /// Insert new historical quotes, returning their identifiers.
    fn insert_quotes(&mut self, quotes: &[NewQuote]) -> Result<Vec<i64>, StoreError>;

    fn insert_issued(&self, issued: &IssuedQuote) -> Result<(), StoreError>;

    /// Most recent issued quotes first.
    fn recent_issued(&self, limit: usize) -> Result<Vec<IssuedQuote>, StoreError>;
}
