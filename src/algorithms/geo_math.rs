//! Pure great-circle helpers on a spherical Earth

use crate::core::{GeoPosition, EARTH_RADIUS_M, METERS_PER_SECOND_PER_KNOT};
use std::f64::consts::PI;

/// Convert degrees to radians
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Great-circle distance between two fixes (meters)
///
/// The intermediate haversine term is clamped to [0, 1] so rounding
/// overshoot near antipodal or coincident points never reaches `sqrt`.
/// Out-of-range coordinates produce a meaningless but non-panicking result.
pub fn haversine_distance_meters(a: &GeoPosition, b: &GeoPosition) -> f64 {
    let d_lat = degrees_to_radians(b.latitude - a.latitude);
    let d_lon = degrees_to_radians(b.longitude - a.longitude);

    let h = (d_lat / 2.0).sin().powi(2)
        + degrees_to_radians(a.latitude).cos()
            * degrees_to_radians(b.latitude).cos()
            * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Forward azimuth from `from` to `to`, in degrees within [0, 360)
pub fn initial_bearing_degrees(from: &GeoPosition, to: &GeoPosition) -> f64 {
    let lat1 = degrees_to_radians(from.latitude);
    let lat2 = degrees_to_radians(to.latitude);
    let d_lon = degrees_to_radians(to.longitude - from.longitude);

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    if y == 0.0 && x == 0.0 {
        return 0.0;
    }

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Wrap any finite angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Convert meters per second to knots
pub fn mps_to_knots(speed_mps: f64) -> f64 {
    speed_mps / METERS_PER_SECOND_PER_KNOT
}

/// Whether `speed_mps` stays finite once converted to knots
pub fn is_reportable_speed(speed_mps: f64) -> bool {
    mps_to_knots(speed_mps).is_finite()
}
