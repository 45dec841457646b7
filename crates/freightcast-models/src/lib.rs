pub mod config;
pub mod estimation;
pub mod quote;
pub mod session;
pub mod store_schema;

pub use config::{CacheConfig, EstimatorConfig, FreightcastConfig, GeocodingConfig, StoreConfig};
pub use estimation::{EstimateMetrics, EstimateOutcome, Estimation, IssuedQuote};
pub use quote::{EstimationRequest, HistoricalQuote, NewQuote};
pub use session::Session;
