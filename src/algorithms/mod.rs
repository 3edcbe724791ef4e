//! Great-circle geometry and fix-derived speed

pub mod geo_math;
pub mod fix_speed;

pub use geo_math::{
    degrees_to_radians, haversine_distance_meters, initial_bearing_degrees, is_reportable_speed,
    mps_to_knots, normalize_degrees,
};
pub use fix_speed::{speed_from_fixes, velocity_from_fixes, FixVelocity};
