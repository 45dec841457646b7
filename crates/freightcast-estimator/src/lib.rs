pub mod error;
pub mod estimator;
pub mod stats;
pub mod trend;

pub use error::EstimateError;
pub use estimator::Estimator;
pub use trend::{comparable_rows, ComparableRow, PriceTrend};
