/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two coordinate pairs,
/// using the haversine formula on a spherical Earth.
///
/// Inputs are degrees. No range validation happens here; callers are
/// expected to hand in sane coordinates.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    // Monterey Bay and Salinas, roughly 30 km apart.
    const MONTEREY: (f64, f64) = (36.6002, -121.8947);
    const SALINAS: (f64, f64) = (36.3283, -121.8863);
    const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);

    #[test]
    fn identical_points_are_zero() {
        let d = calculate_distance(MONTEREY.0, MONTEREY.1, MONTEREY.0, MONTEREY.1);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn distance_is_symmetric() {
        let d1 = calculate_distance(MONTEREY.0, MONTEREY.1, SALINAS.0, SALINAS.1);
        let d2 = calculate_distance(SALINAS.0, SALINAS.1, MONTEREY.0, MONTEREY.1);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn monterey_to_salinas() {
        let d = calculate_distance(MONTEREY.0, MONTEREY.1, SALINAS.0, SALINAS.1);
        assert!((d - 30.2).abs() < 0.5, "got {d}");
    }

    #[test]
    fn monterey_to_san_francisco() {
        let d = calculate_distance(MONTEREY.0, MONTEREY.1, SAN_FRANCISCO.0, SAN_FRANCISCO.1);
        assert!((d - 142.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = calculate_distance(0.0, 0.0, 0.0, 180.0);
        assert!((d - 20015.0).abs() < 5.0, "got {d}");
    }
}
