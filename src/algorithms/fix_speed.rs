//! Speed and course derived from consecutive positional fixes

use crate::algorithms::geo_math::{haversine_distance_meters, initial_bearing_degrees};
use crate::core::GeoPosition;

/// Velocity implied by a pair of fixes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixVelocity {
    /// Ground speed (m/s)
    pub speed_mps: f64,
    /// Course over ground in degrees, `None` when the fixes imply no movement
    pub course_deg: Option<f64>,
}

impl FixVelocity {
    pub fn stationary() -> Self {
        Self {
            speed_mps: 0.0,
            course_deg: None,
        }
    }
}

/// Elapsed seconds between two fixes; negative when `current` is older
fn elapsed_seconds(previous: &GeoPosition, current: &GeoPosition) -> f64 {
    (current.timestamp_ms as f64 - previous.timestamp_ms as f64) / 1000.0
}

/// Instantaneous speed between two fixes (m/s)
///
/// Returns 0 without a previous fix, for duplicate or out-of-order
/// timestamps, and whenever the arithmetic would not be finite.
pub fn speed_from_fixes(previous: Option<&GeoPosition>, current: &GeoPosition) -> f64 {
    velocity_from_fixes(previous, current).speed_mps
}

/// Speed plus course over ground between two fixes
pub fn velocity_from_fixes(previous: Option<&GeoPosition>, current: &GeoPosition) -> FixVelocity {
    let previous = match previous {
        Some(p) => p,
        None => return FixVelocity::stationary(),
    };

    let dt = elapsed_seconds(previous, current);
    if dt <= 0.0 {
        return FixVelocity::stationary();
    }

    let distance = haversine_distance_meters(previous, current);
    let speed_mps = distance / dt;
    if !speed_mps.is_finite() {
        return FixVelocity::stationary();
    }

    let course_deg = if distance > 0.0 {
        Some(initial_bearing_degrees(previous, current))
    } else {
        None
    };

    FixVelocity { speed_mps, course_deg }
}
