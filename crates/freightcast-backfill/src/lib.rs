pub mod backfill;
pub mod distance;
pub mod error;
pub mod geocoder;
pub mod geodesic;

pub use backfill::{run_backfill, BackfillReport};
pub use distance::DistanceResolver;
pub use error::{BackfillError, GeocodeError};
pub use geocoder::{Coordinates, Geocoder, NominatimGeocoder};
