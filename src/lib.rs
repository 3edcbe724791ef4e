//! Knotmeter
//!
//! Speed-over-ground and heading estimation for a handheld device, fusing
//! geographic fixes with vertical-axis acceleration and reporting speed in
//! knots.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod sensors;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use core::{
    AccelerationSample, GeoPosition, OrientationSample, SensorEvent, METERS_PER_SECOND_PER_KNOT,
};
pub use algorithms::{haversine_distance_meters, mps_to_knots, speed_from_fixes};
pub use processing::{BlendPolicy, FusionEstimator, HeadingTracker, InertialIntegrator, IntervalPolicy};
pub use sensors::{
    ExternalFeed, MotionSource, OrientationSource, PositionOptions, PositionSource, SensorError,
    SensorKind,
};
pub use api::{
    SpeedReading, SpeedTracker, TrackerError, TrackerEvent, TrackerResult, TrackingSession,
    OutputFormat, ReadingFormatter,
};
pub use utils::{ConfigError, TrackerConfig};
