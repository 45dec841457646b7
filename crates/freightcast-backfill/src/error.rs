use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {0}")]
    Status(u16),

    #[error("unusable geocoder response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("Store error: {0}")]
    Store(#[from] freightcast_store::StoreError),
}
