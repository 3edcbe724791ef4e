//! Physical constants and estimator defaults

/// Mean Earth radius used by the haversine formula (m)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// One knot expressed in meters per second
pub const METERS_PER_SECOND_PER_KNOT: f64 = 0.514444;

/// Integration step assumed when acceleration samples carry no timing (s)
pub const NOMINAL_SAMPLE_INTERVAL_S: f64 = 0.1;

/// Longest gap between acceleration samples still treated as a sensor rate (s)
pub const MAX_SAMPLE_INTERVAL_S: f64 = 10.0;
