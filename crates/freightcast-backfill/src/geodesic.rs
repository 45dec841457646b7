use crate::geocoder::Coordinates;

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
const MEAN_EARTH_RADIUS_KM: f64 = 6_371.008_8;
const MAX_ITERATIONS: usize = 200;

/// Distance in kilometers along the WGS-84 ellipsoid.
///
/// Uses Vincenty's inverse formula; near-antipodal pairs where it does not
/// converge fall back to the great-circle distance.
pub fn geodesic_km(from: Coordinates, to: Coordinates) -> f64 {
    vincenty_m(from, to)
        .map(|meters| meters / 1000.0)
        .unwrap_or_else(|| haversine_km(from, to))
}

pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

fn vincenty_m(from: Coordinates, to: Coordinates) -> Option<f64> {
    let l = (to.lon - from.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * from.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Equatorial lines have cos_sq_alpha = 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < 1e-12 {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_B * big_a * (sigma - delta_sigma));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dms(degrees: f64, minutes: f64, seconds: f64) -> f64 {
        degrees.signum() * (degrees.abs() + minutes / 60.0 + seconds / 3600.0)
    }

    #[test]
    fn flinders_peak_to_buninyong() {
        // Reference pair from Vincenty's 1975 paper: 54 972.271 m
        let flinders = Coordinates {
            lat: dms(-37.0, 57.0, 3.72030),
            lon: dms(144.0, 25.0, 29.52440),
        };
        let buninyong = Coordinates {
            lat: dms(-37.0, 39.0, 10.15610),
            lon: dms(143.0, 55.0, 35.38390),
        };
        let km = geodesic_km(flinders, buninyong);
        assert!((km - 54.972_271).abs() < 1e-3, "got {km}");
    }

    #[test]
    fn coincident_points_are_zero() {
        let campinas = Coordinates {
            lat: -22.9056,
            lon: -47.0609,
        };
        assert_eq!(geodesic_km(campinas, campinas), 0.0);
    }

    #[test]
    fn symmetric() {
        let sao_paulo = Coordinates {
            lat: -23.5505,
            lon: -46.6333,
        };
        let recife = Coordinates {
            lat: -8.0476,
            lon: -34.877,
        };
        let there = geodesic_km(sao_paulo, recife);
        let back = geodesic_km(recife, sao_paulo);
        assert!((there - back).abs() < 1e-6);
        // Roughly 2 100 km as the crow flies
        assert!(there > 2_050.0 && there < 2_200.0, "got {there}");
    }

    #[test]
    fn ellipsoid_and_sphere_agree_closely() {
        let porto_alegre = Coordinates {
            lat: -30.0346,
            lon: -51.2177,
        };
        let manaus = Coordinates {
            lat: -3.119,
            lon: -60.0217,
        };
        let ellipsoid = geodesic_km(porto_alegre, manaus);
        let sphere = haversine_km(porto_alegre, manaus);
        assert!((ellipsoid - sphere).abs() / ellipsoid < 0.005);
    }

    #[test]
    fn near_antipodal_pair_still_yields_a_distance() {
        let a = Coordinates { lat: 0.0, lon: 0.0 };
        let b = Coordinates {
            lat: 0.5,
            lon: 179.5,
        };
        let km = geodesic_km(a, b);
        assert!(km.is_finite());
        assert!(km > 19_800.0 && km < 20_100.0, "got {km}");
    }
}
