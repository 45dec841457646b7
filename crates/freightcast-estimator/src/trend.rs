use chrono::{DateTime, Utc};
use freightcast_models::HistoricalQuote;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stats::{mean, round2, to_cents};

/// How freight values moved across the comparable quotes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTrend {
    pub first_quoted_at: DateTime<Utc>,
    pub last_quoted_at: DateTime<Utc>,
    pub span_days: i64,
    /// Change in freight value from the oldest to the newest quote, in percent.
    pub variation_pct: f64,
    /// Unweighted mean of value per kg.
    pub mean_unit_price: f64,
}

impl PriceTrend {
    /// None unless there are at least two quotes to compare.
    pub fn from_comparables(comparables: &[HistoricalQuote]) -> Option<Self> {
        if comparables.len() < 2 {
            return None;
        }
        let ordered = by_date(comparables);
        let first = ordered.first()?;
        let last = ordered.last()?;

        let first_value = first.freight_value.to_f64()?;
        let last_value = last.freight_value.to_f64()?;

        Some(Self {
            first_quoted_at: first.quoted_at,
            last_quoted_at: last.quoted_at,
            span_days: (last.quoted_at - first.quoted_at).num_days(),
            variation_pct: round2((last_value - first_value) / first_value * 100.0),
            mean_unit_price: round2(mean(comparables.iter().map(HistoricalQuote::unit_price))?),
        })
    }
}

/// One comparable quote as shown in a detail listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparableRow {
    pub quote_id: i64,
    pub quoted_at: DateTime<Utc>,
    pub carrier: String,
    pub freight_value: Decimal,
    pub cargo_weight_kg: f64,
    pub lead_time_days: u32,
    pub distance_km: Option<f64>,
    pub unit_price: Option<Decimal>,
}

/// Comparables oldest first, each with its value per kg.
pub fn comparable_rows(comparables: &[HistoricalQuote]) -> Vec<ComparableRow> {
    by_date(comparables)
        .into_iter()
        .map(|quote| ComparableRow {
            quote_id: quote.quote_id,
            quoted_at: quote.quoted_at,
            carrier: quote.carrier.clone(),
            freight_value: quote.freight_value,
            cargo_weight_kg: quote.cargo_weight_kg,
            lead_time_days: quote.lead_time_days,
            distance_km: quote.distance_km,
            unit_price: to_cents(quote.unit_price()),
        })
        .collect()
}

fn by_date(comparables: &[HistoricalQuote]) -> Vec<&HistoricalQuote> {
    let mut ordered: Vec<&HistoricalQuote> = comparables.iter().collect();
    ordered.sort_by_key(|quote| quote.quoted_at);
    ordered
}
