use serde::{Deserialize, Serialize};

/// Top-level configuration for freightcast.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FreightcastConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

/// Where historical quotes and issued-quote audit records live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/freightcast.db".to_string(),
        }
    }
}

/// Configuration for the in-memory catalog cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// How long a loaded catalog snapshot is served before the store is read again.
    pub catalog_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            catalog_ttl_seconds: 300,
        }
    }
}

/// Tuning constants of the estimation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Recency weight is `1 + age_days / recency_horizon_days`.
    pub recency_horizon_days: f64,
    /// Calendar months (1-12) treated as high season.
    pub high_season_months: Vec<u32>,
    pub high_season_multiplier: f64,
    /// Fractional surcharge per 1000 km of mean distance.
    pub distance_surcharge_per_1000_km: f64,
    /// Carrier is the mode among quotes newer than this many months.
    pub carrier_window_months: u32,
    /// Length of the analysis window reported in the period label.
    pub report_window_months: u32,
    /// z-score for the confidence half-width (1.96 = 95%).
    pub confidence_z: f64,
    /// Largest weight a request may ask for.
    pub max_weight_kg: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            recency_horizon_days: 180.0,
            high_season_months: vec![11, 12, 1, 2],
            high_season_multiplier: 1.15,
            distance_surcharge_per_1000_km: 0.05,
            carrier_window_months: 3,
            report_window_months: 6,
            confidence_z: 1.96,
            max_weight_kg: 20_000.0,
        }
    }
}

/// Configuration for the geocoding service used by the distance backfill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible search API.
    pub base_url: String,
    pub user_agent: String,
    /// Appended to every city name to disambiguate the lookup.
    pub country_qualifier: String,
    /// Minimum delay between consecutive geocoding calls, in milliseconds.
    pub min_interval_ms: u64,
    pub request_timeout_seconds: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/".to_string(),
            user_agent: "freightcast/0.1".to_string(),
            country_qualifier: "Brasil".to_string(),
            min_interval_ms: 1000,
            request_timeout_seconds: 10,
        }
    }
}
