use std::collections::{BTreeMap, BTreeSet};

use freightcast_models::{EstimationRequest, HistoricalQuote};

const POPULAR_ROUTES: usize = 3;

/// Hints for a request that matched nothing: other cargo types or modalities
/// quoted on the same route, and the busiest routes out of the same origin.
pub fn suggestions(catalog: &[HistoricalQuote], request: &EstimationRequest) -> Vec<String> {
    let on_route: Vec<&HistoricalQuote> = catalog
        .iter()
        .filter(|quote| {
            quote.origin_city == request.origin_city
                && quote.destination_city == request.destination_city
        })
        .collect();

    let mut hints = Vec::new();

    let cargo_types: BTreeSet<&str> = on_route
        .iter()
        .filter(|quote| quote.modality == request.modality)
        .map(|quote| quote.cargo_type.as_str())
        .collect();
    if !cargo_types.is_empty() {
        hints.push(format!(
            "Cargo types quoted on this route by {}: {}",
            request.modality,
            join(cargo_types)
        ));
    }

    let modalities: BTreeSet<&str> = on_route
        .iter()
        .filter(|quote| quote.cargo_type == request.cargo_type)
        .map(|quote| quote.modality.as_str())
        .collect();
    if !modalities.is_empty() {
        hints.push(format!(
            "Modalities quoted on this route for {}: {}",
            request.cargo_type,
            join(modalities)
        ));
    }

    let mut destinations: BTreeMap<&str, usize> = BTreeMap::new();
    for quote in catalog
        .iter()
        .filter(|quote| quote.origin_city == request.origin_city)
    {
        *destinations.entry(quote.destination_city.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = destinations.into_iter().collect();
    // Stable sort keeps alphabetical order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    if !ranked.is_empty() {
        let routes: Vec<String> = ranked
            .into_iter()
            .take(POPULAR_ROUTES)
            .map(|(destination, count)| format!("{destination} ({count})"))
            .collect();
        hints.push(format!(
            "Most quoted routes from {}: {}",
            request.origin_city,
            routes.join(", ")
        ));
    }

    if hints.is_empty() {
        hints.push(format!(
            "No quotes on record from {}; try a more frequently quoted origin",
            request.origin_city
        ));
    }
    hints
}

fn join(values: BTreeSet<&str>) -> String {
    values.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn quote(origin: &str, destination: &str, cargo_type: &str, modality: &str) -> HistoricalQuote {
        HistoricalQuote {
            quote_id: 0,
            origin_city: origin.to_string(),
            destination_city: destination.to_string(),
            cargo_type: cargo_type.to_string(),
            modality: modality.to_string(),
            carrier: "Rápido Norte".to_string(),
            freight_value: dec!(900),
            cargo_weight_kg: 300.0,
            lead_time_days: 4,
            distance_km: None,
            quoted_at: Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap(),
        }
    }

    fn request(cargo_type: &str, modality: &str) -> EstimationRequest {
        EstimationRequest {
            origin_city: "Manaus".to_string(),
            destination_city: "Belém".to_string(),
            cargo_type: cargo_type.to_string(),
            modality: modality.to_string(),
            weight_kg: 500.0,
        }
    }

    #[test]
    fn suggests_alternatives_on_same_route() {
        let catalog = vec![
            quote("Manaus", "Belém", "Seca", "Fluvial"),
            quote("Manaus", "Belém", "Granel", "Fluvial"),
            quote("Manaus", "Belém", "Perigosa", "Aéreo"),
        ];
        let hints = suggestions(&catalog, &request("Perigosa", "Fluvial"));
        assert_eq!(hints[0], "Cargo types quoted on this route by Fluvial: Granel, Seca");
        assert_eq!(hints[1], "Modalities quoted on this route for Perigosa: Aéreo");
        assert_eq!(hints[2], "Most quoted routes from Manaus: Belém (3)");
    }

    #[test]
    fn ranks_popular_destinations() {
        let catalog = vec![
            quote("Manaus", "Porto Velho", "Seca", "Rodoviário"),
            quote("Manaus", "Santarém", "Seca", "Fluvial"),
            quote("Manaus", "Santarém", "Seca", "Fluvial"),
            quote("Manaus", "Boa Vista", "Seca", "Rodoviário"),
            quote("Manaus", "Macapá", "Seca", "Fluvial"),
        ];
        let hints = suggestions(&catalog, &request("Seca", "Fluvial"));
        assert_eq!(
            hints,
            vec!["Most quoted routes from Manaus: Santarém (2), Boa Vista (1), Macapá (1)"]
        );
    }

    #[test]
    fn unknown_origin_gets_generic_hint() {
        let hints = suggestions(&[], &request("Seca", "Fluvial"));
        assert_eq!(hints.len(), 1);
        assert!(hints[0].starts_with("No quotes on record from Manaus"));
    }
}
