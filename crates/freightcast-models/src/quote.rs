use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A historical freight quote as held in the store.
///
/// Loaded once per catalog snapshot and never mutated afterwards, apart from
/// the distance backfill patching `distance_km` before the snapshot is shared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalQuote {
    /// Store identifier, used for distance write-back.
    pub quote_id: i64,
    pub origin_city: String,
    pub destination_city: String,
    pub cargo_type: String,
    pub modality: String,
    pub carrier: String,
    /// Quoted freight value. Always positive.
    pub freight_value: Decimal,
    /// Cargo weight in kilograms. Always positive (used as a divisor).
    pub cargo_weight_kg: f64,
    pub lead_time_days: u32,
    /// Road/geodesic distance between the two cities. None = unknown.
    pub distance_km: Option<f64>,
    pub quoted_at: DateTime<Utc>,
}

impl HistoricalQuote {
    /// Freight value per kilogram.
    pub fn unit_price(&self) -> f64 {
        self.freight_value.to_f64().unwrap_or_default() / self.cargo_weight_kg
    }

    /// Exact, case-sensitive match on the route, cargo type and modality.
    pub fn is_comparable_to(&self, request: &EstimationRequest) -> bool {
        self.origin_city == request.origin_city
            && self.destination_city == request.destination_city
            && self.cargo_type == request.cargo_type
            && self.modality == request.modality
    }

    /// Records with no distance, or a zero placeholder, are backfill candidates.
    pub fn needs_distance(&self) -> bool {
        match self.distance_km {
            None => true,
            Some(km) => km == 0.0,
        }
    }
}

/// A historical quote to be inserted into the store (no identifier yet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewQuote {
    pub origin_city: String,
    pub destination_city: String,
    pub cargo_type: String,
    pub modality: String,
    pub carrier: String,
    pub freight_value: Decimal,
    pub cargo_weight_kg: f64,
    pub lead_time_days: u32,
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub quoted_at: DateTime<Utc>,
}

impl NewQuote {
    /// Reject quotes the catalog could not load back: a value or weight that
    /// is not positive, a negative distance, or a blank name.
    pub fn check(&self) -> Result<(), String> {
        let names = [
            ("origin_city", &self.origin_city),
            ("destination_city", &self.destination_city),
            ("cargo_type", &self.cargo_type),
            ("modality", &self.modality),
            ("carrier", &self.carrier),
        ];
        if let Some((field, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("{field} is empty"));
        }
        if self.freight_value <= Decimal::ZERO {
            return Err(format!("freight_value not positive: {}", self.freight_value));
        }
        if !(self.cargo_weight_kg.is_finite() && self.cargo_weight_kg > 0.0) {
            return Err(format!("cargo_weight_kg not positive: {}", self.cargo_weight_kg));
        }
        if let Some(km) = self.distance_km {
            if !(km.is_finite() && km >= 0.0) {
                return Err(format!("distance_km negative or not finite: {km}"));
            }
        }
        Ok(())
    }
}

/// A request for a freight estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimationRequest {
    pub origin_city: String,
    pub destination_city: String,
    pub cargo_type: String,
    pub modality: String,
    /// Requested cargo weight in kilograms.
    pub weight_kg: f64,
}
