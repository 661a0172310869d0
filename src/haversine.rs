//! Great-circle distance.
//!
//! Basis for the synthetic routing tier when no routing service responds.
//! Less accurate than a routed distance (ignores roads) but always
//! available.

use crate::waypoint::Point;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
pub fn haversine_km(from: Point, to: Point) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let p = Point::new(28.6139, 77.2090);
        let dist = haversine_km(p, p);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Delhi (28.6139, 77.2090) to Mumbai (19.0760, 72.8777)
        // Actual great-circle distance ~1154 km
        let dist = haversine_km(
            Point::new(28.6139, 77.2090),
            Point::new(19.0760, 72.8777),
        );
        assert!(
            dist > 1100.0 && dist < 1200.0,
            "Delhi to Mumbai should be ~1154km, got {}",
            dist
        );
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Point::new(28.6139, 77.2090);
        let b = Point::new(27.1767, 78.0081);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }
}
