//! Great-circle and local-plane geometry on WGS84 degrees.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude used by the flat-earth approximation
/// (69.1 statute miles).
pub const METERS_PER_DEGREE: f64 = 69.1 * 1609.344;

/// Haversine distance in meters.
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial great-circle bearing from point 1 to point 2, degrees in `0..360`.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_lambda = (lon2 - lon1).to_radians();
    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    normalize_degrees(y.atan2(x).to_degrees())
}

/// Great-circle midpoint.
pub fn midpoint(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let lambda1 = lon1.to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let bx = phi2.cos() * d_lambda.cos();
    let by = phi2.cos() * d_lambda.sin();
    let phi_m = (phi1.sin() + phi2.sin()).atan2(((phi1.cos() + bx).powi(2) + by * by).sqrt());
    let lambda_m = lambda1 + by.atan2(phi1.cos() + bx);
    (phi_m.to_degrees(), normalize_longitude(lambda_m.to_degrees()))
}

/// Wraps an angle into `0..360`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Signed smallest rotation from bearing `from` to bearing `to`, in
/// `-180..=180`. Positive is clockwise (a right turn).
pub fn bearing_delta(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Local planar frame around a reference latitude.
///
/// Longitude differences are scaled by cos(latitude) so both axes are in
/// comparable units. Squared distances in this frame are only meaningful
/// over short spans, which is all the matcher needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    cos_lat: f64,
}

impl LocalFrame {
    pub fn new(ref_lat: f64) -> Self {
        Self {
            cos_lat: ref_lat.to_radians().cos(),
        }
    }

    /// Planar offset of (`lat`, `lon`) from the origin, in scaled degrees.
    #[inline]
    pub fn offset(&self, lat0: f64, lon0: f64, lat: f64, lon: f64) -> (f64, f64) {
        ((lon - lon0) * self.cos_lat, lat - lat0)
    }

    /// Squared planar distance in scaled degrees².
    #[inline]
    pub fn distance_sq(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        let (dx, dy) = self.offset(lat1, lon1, lat2, lon2);
        dx * dx + dy * dy
    }

    /// Planar distance in meters.
    #[inline]
    pub fn distance_m(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        self.distance_sq(lat1, lon1, lat2, lon2).sqrt() * METERS_PER_DEGREE
    }

    /// Converts meters to this frame's squared units.
    #[inline]
    pub fn meters_to_sq(meters: f64) -> f64 {
        let d = meters / METERS_PER_DEGREE;
        d * d
    }
}

/// Flat-earth distance in meters, scaled at the first point's latitude.
pub fn linear_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    LocalFrame::new(lat1).distance_m(lat1, lon1, lat2, lon2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_one_degree_latitude() {
        assert_relative_eq!(haversine(0.0, 0.0, 1.0, 0.0), 111_194.9, epsilon = 1.0);
    }

    #[test]
    fn test_haversine_known_pair() {
        // Barcelona to Madrid, about 505 km.
        let d = haversine(41.3874, 2.1686, 40.4168, -3.7038);
        assert_relative_eq!(d, 505_000.0, max_relative = 0.01);
    }

    #[test]
    fn test_bearing_cardinals() {
        assert_relative_eq!(bearing(0.0, 0.0, 1.0, 0.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(bearing(0.0, 0.0, 0.0, 1.0), 90.0, epsilon = 1e-9);
        assert_relative_eq!(bearing(0.0, 0.0, -1.0, 0.0), 180.0, epsilon = 1e-9);
        assert_relative_eq!(bearing(0.0, 0.0, 0.0, -1.0), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bearing_delta_sign() {
        assert_relative_eq!(bearing_delta(0.0, 90.0), 90.0);
        assert_relative_eq!(bearing_delta(90.0, 0.0), -90.0);
        assert_relative_eq!(bearing_delta(350.0, 10.0), 20.0);
        assert_relative_eq!(bearing_delta(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_midpoint_on_equator() {
        let (lat, lon) = midpoint(0.0, 0.0, 0.0, 10.0);
        assert_relative_eq!(lat, 0.0, epsilon = 1e-9);
        assert_relative_eq!(lon, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_distance_tracks_haversine_over_short_spans() {
        let (lat, lon) = (41.39, 2.17);
        for (dlat, dlon) in [(0.001, 0.0), (0.0, 0.002), (0.003, -0.004), (-0.01, 0.01)] {
            let h = haversine(lat, lon, lat + dlat, lon + dlon);
            let l = linear_distance(lat, lon, lat + dlat, lon + dlon);
            assert_relative_eq!(l, h, max_relative = 0.005);
        }
    }
}
