use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quote::{EstimationRequest, HistoricalQuote};
use crate::session::Session;

/// Result of one estimation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimateOutcome {
    Estimated(Box<Estimation>),
    /// No historical quote matched the route, cargo type and modality.
    NoComparableData,
}

impl EstimateOutcome {
    pub fn estimation(&self) -> Option<&Estimation> {
        match self {
            EstimateOutcome::Estimated(estimation) => Some(estimation),
            EstimateOutcome::NoComparableData => None,
        }
    }
}

/// A freight estimate built from comparable historical quotes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Estimation {
    pub request: EstimationRequest,
    /// Adjusted unit price times requested weight, rounded to 2 decimals.
    pub estimated_value: Decimal,
    pub lead_time_days: u32,
    pub carrier: String,
    pub metrics: EstimateMetrics,
    /// The comparable quotes the estimate was built from.
    pub comparables: Vec<HistoricalQuote>,
    pub estimated_at: DateTime<Utc>,
}

/// Statistics reported alongside an estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimateMetrics {
    /// 95% confidence half-width, scaled by the requested weight.
    /// None when fewer than two comparables make the sample stddev undefined.
    pub confidence_half_width: Option<Decimal>,
    pub sample_count: usize,
    /// Analysis window label, e.g. `2026-04 to 2026-10`.
    pub period: String,
    pub mean_distance_km: Option<f64>,
    pub high_season: bool,
    /// Multiplier applied for mean distance. Exactly 1.0 when distance is unknown.
    pub distance_multiplier: f64,
    /// Unit price after seasonal and distance adjustments.
    pub adjusted_unit_price: f64,
}

/// Audit record written for every estimate handed to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedQuote {
    pub id: Uuid,
    pub user: String,
    pub origin_city: String,
    pub destination_city: String,
    pub cargo_type: String,
    pub modality: String,
    pub cargo_weight_kg: f64,
    pub carrier: String,
    pub estimated_value: Decimal,
    pub lead_time_days: u32,
    pub sample_count: usize,
    pub period: String,
    pub issued_at: DateTime<Utc>,
}

impl IssuedQuote {
    pub fn new(session: &Session, estimation: &Estimation, issued_at: DateTime<Utc>) -> Self {
        let request = &estimation.request;
        Self {
            id: Uuid::new_v4(),
            user: session.user.clone(),
            origin_city: request.origin_city.clone(),
            destination_city: request.destination_city.clone(),
            cargo_type: request.cargo_type.clone(),
            modality: request.modality.clone(),
            cargo_weight_kg: request.weight_kg,
            carrier: estimation.carrier.clone(),
            estimated_value: estimation.estimated_value,
            lead_time_days: estimation.lead_time_days,
            sample_count: estimation.metrics.sample_count,
            period: estimation.metrics.period.clone(),
            issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_estimation() -> Estimation {
        Estimation {
            request: EstimationRequest {
                origin_city: "Campinas".to_string(),
                destination_city: "Curitiba".to_string(),
                cargo_type: "Paletizada".to_string(),
                modality: "Rodoviário".to_string(),
                weight_kg: 800.0,
            },
            estimated_value: dec!(2140.37),
            lead_time_days: 3,
            carrier: "TransSul".to_string(),
            metrics: EstimateMetrics {
                confidence_half_width: Some(dec!(112.08)),
                sample_count: 4,
                period: "2026-04 to 2026-10".to_string(),
                mean_distance_km: Some(485.2),
                high_season: false,
                distance_multiplier: 1.02426,
                adjusted_unit_price: 2.6754625,
            },
            comparables: vec![],
            estimated_at: Utc::now(),
        }
    }

    #[test]
    fn outcome_is_tagged_by_status() {
        let json = serde_json::to_value(EstimateOutcome::NoComparableData).unwrap();
        assert_eq!(json, serde_json::json!({"status": "no_comparable_data"}));

        let estimated = EstimateOutcome::Estimated(Box::new(sample_estimation()));
        let json = serde_json::to_value(&estimated).unwrap();
        assert_eq!(json["status"], "estimated");
        assert_eq!(json["carrier"], "TransSul");
        assert_eq!(json["estimated_value"], "2140.37");
    }

    #[test]
    fn roundtrip_outcome() {
        let outcome = EstimateOutcome::Estimated(Box::new(sample_estimation()));
        let json = serde_json::to_string(&outcome).unwrap();
        let parsed: EstimateOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, parsed);
    }

    #[test]
    fn issued_quote_copies_request_and_result() {
        let estimation = sample_estimation();
        let session = Session::new("ana");
        let issued = IssuedQuote::new(&session, &estimation, Utc::now());

        assert_eq!(issued.user, "ana");
        assert_eq!(issued.origin_city, "Campinas");
        assert_eq!(issued.cargo_weight_kg, 800.0);
        assert_eq!(issued.estimated_value, dec!(2140.37));
        assert_eq!(issued.sample_count, 4);
        assert_eq!(issued.period, "2026-04 to 2026-10");
    }
}
