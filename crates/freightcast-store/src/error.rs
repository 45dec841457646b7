use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt issued-quote record {id}: {reason}")]
    CorruptAudit { id: String, reason: String },

    #[error("Quote {index} rejected: {reason}")]
    InvalidQuote { index: usize, reason: String },

    #[error("Failed to create store directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store not available: {0}")]
    Unavailable(String),
}
