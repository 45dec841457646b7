//! freightcast - freight quote estimation from historical quotes
//!
//! Estimates the freight value, lead time and carrier for a route, cargo type
//! and modality from comparable quotes on record, and keeps an audit trail of
//! every estimate handed out.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use freightcast::models::{EstimationRequest, Session};
//! use freightcast::models::config::FreightcastConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let quoter = freightcast::build_quoter(&FreightcastConfig::default())?;
//! let request = EstimationRequest {
//!     origin_city: "São Paulo".to_string(),
//!     destination_city: "Curitiba".to_string(),
//!     cargo_type: "Seca".to_string(),
//!     modality: "Rodoviário".to_string(),
//!     weight_kg: 1200.0,
//! };
//! let response = quoter.quote(&Session::new("ana"), &request).await?;
//! # Ok(())
//! # }
//! ```

pub use freightcast_estimator as estimator;
pub use freightcast_models as models;
pub use freightcast_store as store;

pub mod quoter;
pub mod suggest;

pub use quoter::{QuoteResponse, Quoter};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use freightcast_estimator::Estimator;
use freightcast_models::config::FreightcastConfig;
use freightcast_store::{Catalog, SqliteStore};

/// Build a Quoter backed by the configured SQLite store.
pub fn build_quoter(config: &FreightcastConfig) -> Result<Quoter, anyhow::Error> {
    let store = SqliteStore::open(&config.store.sqlite_path)
        .with_context(|| format!("Failed to open quote store: {}", config.store.sqlite_path))?;
    let catalog = Arc::new(Catalog::new(
        Box::new(store),
        Duration::from_secs(config.cache.catalog_ttl_seconds),
    ));
    Ok(Quoter::new(catalog, Estimator::new(config.estimator.clone())))
}
