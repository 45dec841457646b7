pub mod catalog;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use catalog::{Catalog, DistanceWrite, RequestOptions};
pub use error::StoreError;
pub use memory::{CatalogCache, Snapshot};
pub use sqlite::SqliteStore;
pub use store::{CatalogLoad, DistanceUpdate, QuoteStore};
