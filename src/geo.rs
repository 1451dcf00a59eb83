//! Great-circle distance on a spherical Earth.

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two latitude/longitude pairs given in degrees.
///
/// Uses `atan2` rather than `asin` so the result stays finite for any real inputs.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = lat2_rad - lat1_rad;
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_self_distance_is_zero() {
        assert_eq!(haversine_distance(48.8584, 2.2945, 48.8584, 2.2945), 0.0);
        assert_eq!(haversine_distance(-90.0, 180.0, -90.0, 180.0), 0.0);
    }

    #[test]
    fn test_one_degree_along_equator() {
        let expected = EARTH_RADIUS_KM * 1f64.to_radians();
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - expected).abs() < 1e-9);
    }

    #[test]
    fn test_paris_landmarks() {
        // Eiffel Tower -> Louvre is a little over 3 km.
        let d = haversine_distance(48.8584, 2.2945, 48.8606, 2.3376);
        assert!(d > 3.0 && d < 3.3, "unexpected distance {}", d);
    }

    #[test]
    fn test_antipodes() {
        let d = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry_and_triangle_inequality() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let a = (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let b = (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let c = (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));

            let ab = haversine_distance(a.0, a.1, b.0, b.1);
            let ba = haversine_distance(b.0, b.1, a.0, a.1);
            assert!(ab >= 0.0);
            assert!((ab - ba).abs() < 1e-9);

            let ac = haversine_distance(a.0, a.1, c.0, c.1);
            let cb = haversine_distance(c.0, c.1, b.0, b.1);
            assert!(ab <= ac + cb + 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_input_does_not_panic() {
        let d = haversine_distance(120.0, 0.0, -95.0, 400.0);
        assert!(!d.is_nan());
        assert!(haversine_distance(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }
}
