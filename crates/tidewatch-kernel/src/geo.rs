//! Great-circle distance between WGS-84 coordinates.

use tidewatch_types::GeoPoint;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between `a` and `b`, in metres.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude_deg.to_radians();
    let lat2 = b.latitude_deg.to_radians();
    let delta_lat = (b.latitude_deg - a.latitude_deg).to_radians();
    let delta_lon = (b.longitude_deg - a.longitude_deg).to_radians();

    let sin_dlat = (delta_lat / 2.0).sin();
    let sin_dlon = (delta_lon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    // Rounding can push h a hair past 1.0 for antipodal points.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let p = GeoPoint::new(41.18, -8.70);
        assert!(distance_m(p, p) < 1e-6);
    }

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let d = distance_m(GeoPoint::new(35.0, 139.0), GeoPoint::new(36.0, 139.0));
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }

    #[test]
    fn short_offset_near_leixoes() {
        // ~0.0004 deg of latitude is roughly 44 m.
        let a = GeoPoint::new(41.1850, -8.7060);
        let b = GeoPoint::new(41.1854, -8.7060);
        let d = distance_m(a, b);
        assert!(d > 40.0 && d < 50.0, "got {d}");
    }

    #[test]
    fn is_symmetric() {
        let a = GeoPoint::new(-33.9, 18.4);
        let b = GeoPoint::new(51.5, -0.12);
        assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-6);
    }
}
