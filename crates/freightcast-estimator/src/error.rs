use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EstimateError {
    #[error("Invalid estimation request: {0}")]
    InvalidRequest(String),

    /// Recency weights summed to zero or less (quotes dated far in the future).
    #[error("Recency weights of {0} comparable quotes do not sum to a positive total")]
    DegenerateWeights(usize),

    #[error("Estimate is not a finite amount: {0}")]
    NonFinite(f64),
}
