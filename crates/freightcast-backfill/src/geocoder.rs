//! Geocoding seam and the Nominatim client behind it.

use std::time::Duration;

use async_trait::async_trait;
use freightcast_models::GeocodingConfig;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::GeocodeError;

/// A point in decimal degrees (WGS-84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Turns a free-text place name into coordinates. Mockable for testing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the service answered but found nothing.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Client for a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    http: Client,
    search_url: Url,
}

/// Nominatim returns coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let search_url = Url::parse(&config.base_url)?.join("search")?;
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { http, search_url })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        debug!(query, "Geocoding");
        let response = self
            .http
            .get(self.search_url.clone())
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_search_response(&body)
    }
}

fn parse_search_response(body: &str) -> Result<Option<Coordinates>, GeocodeError> {
    let hits: Vec<SearchHit> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let lat: f64 = hit
        .lat
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("latitude {:?}", hit.lat)))?;
    let lon: f64 = hit
        .lon
        .parse()
        .map_err(|_| GeocodeError::Parse(format!("longitude {:?}", hit.lon)))?;
    Ok(Some(Coordinates { lat, lon }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_hit() {
        let body = r#"[
            {"place_id": 1, "lat": "-22.9056391", "lon": "-47.0609230", "display_name": "Campinas"},
            {"place_id": 2, "lat": "0", "lon": "0", "display_name": "elsewhere"}
        ]"#;
        let coords = parse_search_response(body).unwrap().unwrap();
        assert_eq!(coords.lat, -22.9056391);
        assert_eq!(coords.lon, -47.060923);
    }

    #[test]
    fn empty_result_is_not_found() {
        assert_eq!(parse_search_response("[]").unwrap(), None);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_search_response("<html>rate limited</html>"),
            Err(GeocodeError::Parse(_))
        ));
        assert!(matches!(
            parse_search_response(r#"[{"lat": "north", "lon": "1"}]"#),
            Err(GeocodeError::Parse(_))
        ));
    }

    #[test]
    fn search_url_joins_base() {
        let geocoder = NominatimGeocoder::new(&GeocodingConfig::default()).unwrap();
        assert_eq!(
            geocoder.search_url().as_str(),
            "https://nominatim.openstreetmap.org/search"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = GeocodingConfig {
            base_url: "not a url".to_string(),
            ..GeocodingConfig::default()
        };
        assert!(matches!(
            NominatimGeocoder::new(&config),
            Err(GeocodeError::InvalidUrl(_))
        ));
    }
}
