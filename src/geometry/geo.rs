// fmgc-vnav/src/geometry/geo.rs

use serde::{Deserialize, Serialize};

/// Earth radius in nautical miles.
const EARTH_RADIUS_NM: f64 = 3440.065;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

/// Great circle distance in nautical miles (haversine).
pub fn distance_nm(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_long = (to.long - from.long).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_NM * c
}

/// Initial true bearing from `from` to `to`, in degrees [0, 360).
pub fn bearing(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_long = (to.long - from.long).to_radians();

    let x = delta_long.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_long.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Point at `fraction` of the way along the great circle from `from` to `to`.
pub fn intermediate_point(from: &Coordinates, to: &Coordinates, fraction: f64) -> Coordinates {
    let delta = distance_nm(from, to) / EARTH_RADIUS_NM;
    if delta < 1e-12 {
        return *from;
    }

    let lat1 = from.lat.to_radians();
    let long1 = from.long.to_radians();
    let lat2 = to.lat.to_radians();
    let long2 = to.long.to_radians();

    let a = ((1.0 - fraction) * delta).sin() / delta.sin();
    let b = (fraction * delta).sin() / delta.sin();

    let x = a * lat1.cos() * long1.cos() + b * lat2.cos() * long2.cos();
    let y = a * lat1.cos() * long1.sin() + b * lat2.cos() * long2.sin();
    let z = a * lat1.sin() + b * lat2.sin();

    Coordinates {
        lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        long: y.atan2(x).to_degrees(),
    }
}

/// Signed difference `to - from` between two courses, in (-180, 180].
pub fn course_change(from: f64, to: f64) -> f64 {
    let diff = (to - from).rem_euclid(360.0);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_one_degree_of_latitude_is_sixty_nm() {
        let a = Coordinates::new(0., 0.);
        let b = Coordinates::new(1., 0.);
        assert_abs_diff_eq!(distance_nm(&a, &b), 60.04, epsilon = 0.01);
    }

    #[test]
    fn test_bearing_cardinal() {
        let origin = Coordinates::new(0., 0.);
        assert_abs_diff_eq!(bearing(&origin, &Coordinates::new(1., 0.)), 0., epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(&origin, &Coordinates::new(0., 1.)), 90., epsilon = 1e-9);
    }

    #[test]
    fn test_intermediate_point_halfway() {
        let a = Coordinates::new(0., 0.);
        let b = Coordinates::new(0., 2.);
        let mid = intermediate_point(&a, &b, 0.5);
        assert_abs_diff_eq!(mid.lat, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(mid.long, 1., epsilon = 1e-9);
        assert_eq!(intermediate_point(&a, &a, 0.3), a);
    }

    #[test]
    fn test_course_change_wraps() {
        assert_abs_diff_eq!(course_change(350., 10.), 20.);
        assert_abs_diff_eq!(course_change(10., 350.), -20.);
    }
}
