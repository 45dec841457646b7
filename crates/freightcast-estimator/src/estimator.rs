use chrono::{DateTime, Datelike, Months, Utc};
use freightcast_models::{
    EstimateMetrics, EstimateOutcome, Estimation, EstimationRequest, EstimatorConfig,
    HistoricalQuote,
};
use tracing::{debug, info};

use crate::error::EstimateError;
use crate::stats::{mean, mode_first_seen, round2, sample_std_dev, to_cents, weighted_mean};

const SECONDS_PER_DAY: i64 = 86_400;

/// Estimates freight value, lead time and carrier from comparable historical quotes.
///
/// Pure over its inputs: the same catalog, request and `now` always give the
/// same outcome. `now` drives the recency weights, the seasonal multiplier
/// and the carrier window.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn estimate(
        &self,
        catalog: &[HistoricalQuote],
        request: &EstimationRequest,
        now: DateTime<Utc>,
    ) -> Result<EstimateOutcome, EstimateError> {
        self.validate(request)?;

        let comparables: Vec<&HistoricalQuote> = catalog
            .iter()
            .filter(|quote| quote.is_comparable_to(request))
            .collect();

        if comparables.is_empty() {
            debug!(
                origin = %request.origin_city,
                destination = %request.destination_city,
                cargo_type = %request.cargo_type,
                modality = %request.modality,
                "No comparable quotes"
            );
            return Ok(EstimateOutcome::NoComparableData);
        }

        let weights: Vec<f64> = comparables
            .iter()
            .map(|quote| self.recency_weight(quote.quoted_at, now))
            .collect();
        let unit_prices: Vec<f64> = comparables.iter().map(|quote| quote.unit_price()).collect();
        let lead_times: Vec<f64> = comparables
            .iter()
            .map(|quote| f64::from(quote.lead_time_days))
            .collect();

        let weighted_unit_price = weighted_mean(&unit_prices, &weights)
            .ok_or(EstimateError::DegenerateWeights(comparables.len()))?;
        let weighted_lead_time = weighted_mean(&lead_times, &weights)
            .ok_or(EstimateError::DegenerateWeights(comparables.len()))?;

        let high_season = self.is_high_season(now);
        let mut adjusted_unit_price = weighted_unit_price;
        if high_season {
            adjusted_unit_price *= self.config.high_season_multiplier;
        }

        let mean_distance_km = mean(comparables.iter().filter_map(|quote| quote.distance_km));
        let distance_multiplier = self.distance_multiplier(mean_distance_km);
        adjusted_unit_price *= distance_multiplier;

        let raw_value = adjusted_unit_price * request.weight_kg;
        let estimated_value = to_cents(raw_value).ok_or(EstimateError::NonFinite(raw_value))?;

        let confidence_half_width = match sample_std_dev(&unit_prices) {
            Some(std_dev) => {
                let half_width = self.config.confidence_z * std_dev
                    / (unit_prices.len() as f64).sqrt()
                    * request.weight_kg;
                Some(to_cents(half_width).ok_or(EstimateError::NonFinite(half_width))?)
            }
            None => None,
        };

        let carrier = self.select_carrier(&comparables, now);

        let estimation = Estimation {
            request: request.clone(),
            estimated_value,
            lead_time_days: weighted_lead_time.round_ties_even().max(0.0) as u32,
            carrier,
            metrics: EstimateMetrics {
                confidence_half_width,
                sample_count: comparables.len(),
                period: self.period_label(now),
                mean_distance_km: mean_distance_km.map(round2),
                high_season,
                distance_multiplier,
                adjusted_unit_price,
            },
            comparables: comparables.into_iter().cloned().collect(),
            estimated_at: now,
        };

        info!(
            origin = %request.origin_city,
            destination = %request.destination_city,
            samples = estimation.metrics.sample_count,
            value = %estimation.estimated_value,
            carrier = %estimation.carrier,
            high_season,
            "Estimate computed"
        );

        Ok(EstimateOutcome::Estimated(Box::new(estimation)))
    }

    /// `1 + age_days / horizon`, with age floored to whole days.
    ///
    /// Grows with age: an older quote weighs more than a recent one.
    pub fn recency_weight(&self, quoted_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_days = (now - quoted_at).num_seconds().div_euclid(SECONDS_PER_DAY);
        1.0 + age_days as f64 / self.config.recency_horizon_days
    }

    pub fn is_high_season(&self, now: DateTime<Utc>) -> bool {
        self.config.high_season_months.contains(&now.month())
    }

    /// Exactly 1.0 when no comparable has a known distance.
    pub fn distance_multiplier(&self, mean_distance_km: Option<f64>) -> f64 {
        match mean_distance_km {
            Some(km) => 1.0 + (km / 1000.0) * self.config.distance_surcharge_per_1000_km,
            None => 1.0,
        }
    }

    /// Mode of carriers quoted inside the carrier window, or of all
    /// comparables when none are that recent.
    fn select_carrier(&self, comparables: &[&HistoricalQuote], now: DateTime<Utc>) -> String {
        let cutoff = now
            .checked_sub_months(Months::new(self.config.carrier_window_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let recent = mode_first_seen(
            comparables
                .iter()
                .filter(|quote| quote.quoted_at >= cutoff)
                .map(|quote| quote.carrier.as_str()),
        );
        recent
            .or_else(|| mode_first_seen(comparables.iter().map(|quote| quote.carrier.as_str())))
            .unwrap_or_default()
            .to_string()
    }

    /// e.g. `2026-04 to 2026-10` for a six-month window ending October 2026.
    pub fn period_label(&self, now: DateTime<Utc>) -> String {
        let start = now
            .checked_sub_months(Months::new(self.config.report_window_months))
            .unwrap_or(now);
        format!("{} to {}", start.format("%Y-%m"), now.format("%Y-%m"))
    }

    fn validate(&self, request: &EstimationRequest) -> Result<(), EstimateError> {
        let fields = [
            ("origin_city", &request.origin_city),
            ("destination_city", &request.destination_city),
            ("cargo_type", &request.cargo_type),
            ("modality", &request.modality),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(EstimateError::InvalidRequest(format!("{name} is empty")));
            }
        }

        let weight = request.weight_kg;
        if !weight.is_finite() || weight <= 0.0 {
            return Err(EstimateError::InvalidRequest(format!(
                "weight_kg must be positive, got {weight}"
            )));
        }
        if weight > self.config.max_weight_kg {
            return Err(EstimateError::InvalidRequest(format!(
                "weight_kg {weight} exceeds maximum {}",
                self.config.max_weight_kg
            )));
        }
        Ok(())
    }
}
