use std::sync::Arc;

use chrono::{DateTime, Utc};
use freightcast_estimator::{comparable_rows, ComparableRow, Estimator, PriceTrend};
use freightcast_models::{EstimateOutcome, EstimationRequest, IssuedQuote, NewQuote, Session};
use freightcast_store::{Catalog, RequestOptions};
use serde::Serialize;
use tracing::{info, warn};

use crate::suggest::suggestions;

/// Everything handed back for one estimation request.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub outcome: EstimateOutcome,
    /// Comparables oldest first, with value per kg.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comparables: Vec<ComparableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<PriceTrend>,
    /// Alternatives to try when nothing matched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    /// Non-fatal problems, e.g. the audit record could not be written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Estimation entry point: reads the catalog, runs the estimator and
/// records an audit entry for every estimate issued.
pub struct Quoter {
    catalog: Arc<Catalog>,
    estimator: Estimator,
}

impl Quoter {
    pub fn new(catalog: Arc<Catalog>, estimator: Estimator) -> Self {
        Self { catalog, estimator }
    }

    pub async fn quote(
        &self,
        session: &Session,
        request: &EstimationRequest,
    ) -> Result<QuoteResponse, anyhow::Error> {
        self.quote_at(session, request, Utc::now()).await
    }

    pub async fn quote_at(
        &self,
        session: &Session,
        request: &EstimationRequest,
        now: DateTime<Utc>,
    ) -> Result<QuoteResponse, anyhow::Error> {
        let snapshot = self.catalog.snapshot().await?;
        let outcome = self.estimator.estimate(&snapshot, request, now)?;

        let mut response = QuoteResponse {
            outcome,
            comparables: Vec::new(),
            trend: None,
            suggestions: Vec::new(),
            warnings: Vec::new(),
        };

        match response.outcome.estimation() {
            Some(estimation) => {
                response.comparables = comparable_rows(&estimation.comparables);
                response.trend = PriceTrend::from_comparables(&estimation.comparables);

                let issued = IssuedQuote::new(session, estimation, now);
                match self.catalog.record_issued(&issued) {
                    Ok(()) => info!(id = %issued.id, user = %issued.user, "Issued quote recorded"),
                    Err(e) => {
                        warn!(user = %session.user, error = %e, "Failed to record issued quote");
                        response
                            .warnings
                            .push(format!("estimate was not recorded in history: {e}"));
                    }
                }
            }
            None => {
                response.suggestions = suggestions(&snapshot, request);
            }
        }

        Ok(response)
    }

    /// Add historical quotes to the catalog.
    pub async fn import(&self, quotes: &[NewQuote]) -> Result<Vec<i64>, anyhow::Error> {
        Ok(self.catalog.record_quotes(quotes).await?)
    }

    /// Most recent issued quotes first.
    pub fn history(&self, limit: usize) -> Result<Vec<IssuedQuote>, anyhow::Error> {
        Ok(self.catalog.recent_issued(limit)?)
    }

    pub async fn options(&self) -> Result<RequestOptions, anyhow::Error> {
        Ok(self.catalog.options().await?)
    }
}
