//! Core data types for the speed estimator

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Timestamped geographic fix from a positional source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Fix time (milliseconds since epoch)
    pub timestamp_ms: u64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
        }
    }

    /// Whether both coordinates are finite and inside their geodetic ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Single reading from the inertial source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    /// Acceleration along the tracked axis (m/s²)
    pub vertical_component: f64,
    /// Sample time (milliseconds); absent when the source has no per-sample timing
    #[serde(default)]
    pub timestamp_ms: Option<u64>,
}

impl AccelerationSample {
    pub fn new(vertical_component: f64) -> Self {
        Self {
            vertical_component,
            timestamp_ms: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Build a sample from a raw 3-axis reading by projecting it onto `axis`
    pub fn from_axes(
        acceleration: Vector3<f64>,
        axis: &Unit<Vector3<f64>>,
        timestamp_ms: Option<u64>,
    ) -> Self {
        Self {
            vertical_component: acceleration.dot(axis.as_ref()),
            timestamp_ms,
        }
    }
}

/// Single reading from the orientation source
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationSample {
    /// Compass heading in degrees, if the platform reports one
    #[serde(default)]
    pub heading_degrees: Option<f64>,
}

impl OrientationSample {
    pub fn new(heading_degrees: f64) -> Self {
        Self {
            heading_degrees: Some(heading_degrees),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

/// Any sample a host can push into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorEvent {
    Position(GeoPosition),
    Acceleration(AccelerationSample),
    Orientation(OrientationSample),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_validity() {
        assert!(GeoPosition::new(45.0, 9.0, 0).is_valid());
        assert!(GeoPosition::new(-90.0, 180.0, 0).is_valid());
        assert!(!GeoPosition::new(91.0, 0.0, 0).is_valid());
        assert!(!GeoPosition::new(0.0, -180.5, 0).is_valid());
        assert!(!GeoPosition::new(f64::NAN, 0.0, 0).is_valid());
    }

    #[test]
    fn test_acceleration_from_axes_projects_onto_axis() {
        let axis = Unit::new_normalize(Vector3::new(0.0, 0.0, 2.0));
        let sample = AccelerationSample::from_axes(Vector3::new(1.0, -3.0, 0.5), &axis, Some(40));

        assert_relative_eq!(sample.vertical_component, 0.5);
        assert_eq!(sample.timestamp_ms, Some(40));
    }

    #[test]
    fn test_sensor_event_json() {
        let json = r#"[
            {"type": "position", "latitude": 45.1, "longitude": 9.2, "timestamp_ms": 1000},
            {"type": "acceleration", "vertical_component": 0.3},
            {"type": "orientation"}
        ]"#;

        let events: Vec<SensorEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], SensorEvent::Position(GeoPosition::new(45.1, 9.2, 1000)));
        assert_eq!(events[1], SensorEvent::Acceleration(AccelerationSample::new(0.3)));
        assert_eq!(events[2], SensorEvent::Orientation(OrientationSample::missing()));
    }
}
