use std::sync::Arc;
use std::time::Duration;

use freightcast_models::GeocodingConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::geocoder::{Coordinates, Geocoder};
use crate::geodesic::geodesic_km;

/// Resolves the road-agnostic distance between two cities.
///
/// Every failure (network, no hit, unparseable reply) degrades to `None`:
/// a missing distance just means the quote contributes no distance signal.
/// Calls to the geocoder are spaced at least `min_interval` apart to respect
/// the public service's usage policy.
pub struct DistanceResolver {
    geocoder: Arc<dyn Geocoder>,
    country_qualifier: String,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl DistanceResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        country_qualifier: impl Into<String>,
        min_interval: Duration,
    ) -> Self {
        Self {
            geocoder,
            country_qualifier: country_qualifier.into(),
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn from_config(geocoder: Arc<dyn Geocoder>, config: &GeocodingConfig) -> Self {
        Self::new(
            geocoder,
            config.country_qualifier.clone(),
            Duration::from_millis(config.min_interval_ms),
        )
    }

    /// Geodesic distance in km, rounded to two decimals. `None` if either
    /// city cannot be located.
    pub async fn resolve(&self, origin_city: &str, destination_city: &str) -> Option<f64> {
        let origin = self.locate(origin_city).await?;
        let destination = self.locate(destination_city).await?;
        let km = geodesic_km(origin, destination);
        debug!(origin_city, destination_city, km, "Distance resolved");
        Some((km * 100.0).round() / 100.0)
    }

    async fn locate(&self, city: &str) -> Option<Coordinates> {
        let query = self.query_for(city);
        self.pace().await;
        match self.geocoder.geocode(&query).await {
            Ok(Some(coords)) => Some(coords),
            Ok(None) => {
                warn!(geocoder = self.geocoder.name(), query, "No geocoding result");
                None
            }
            Err(e) => {
                warn!(geocoder = self.geocoder.name(), query, error = %e, "Geocoding failed");
                None
            }
        }
    }

    fn query_for(&self, city: &str) -> String {
        if self.country_qualifier.is_empty() {
            city.to_string()
        } else {
            format!("{city}, {}", self.country_qualifier)
        }
    }

    /// Wait out the remainder of `min_interval` since the previous call.
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            tokio::time::sleep_until(previous + self.min_interval).await;
        }
        *last_call = Some(Instant::now());
    }
}
