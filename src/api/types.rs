//! Common API types and data structures

use crate::sensors::{SensorError, SensorKind};
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors surfaced once at the tracker boundary
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    /// A required capability is missing; tracking did not begin
    #[error("{sensor} sensor unavailable")]
    SensorUnavailable { sensor: SensorKind },
    /// Permission refused; tracking did not begin or has stopped
    #[error("{sensor} sensor permission denied")]
    SensorDenied { sensor: SensorKind },
    /// `start` while tracking under [`RestartPolicy::Reject`]
    #[error("tracking already active")]
    AlreadyTracking,
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TrackerError {
    /// Map a fatal sensor error for `sensor` to its boundary error
    pub(crate) fn from_sensor(sensor: SensorKind, error: &SensorError) -> Option<Self> {
        match error {
            SensorError::Unavailable => Some(TrackerError::SensorUnavailable { sensor }),
            SensorError::PermissionDenied => Some(TrackerError::SensorDenied { sensor }),
            _ => None,
        }
    }
}

/// What `start` does when a session is already running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Keep the running session, report success
    Ignore,
    /// Keep the running session, report [`TrackerError::AlreadyTracking`]
    Reject,
    /// Stop the running session, then start the new one
    Restart,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        RestartPolicy::Restart
    }
}

/// Which stream produced a speed update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedSource {
    PositionFix,
    Inertial,
}

/// Speed update pushed to the shell layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedReading {
    /// Blended speed (knots)
    pub speed_knots: f64,
    /// Course over ground from the last two fixes (degrees)
    pub course_deg: Option<f64>,
    /// Timestamp of the sample that caused the update (milliseconds)
    pub timestamp_ms: Option<u64>,
    pub source: SpeedSource,
}

/// Heading update pushed to the shell layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingReading {
    /// Heading in [0, 360) degrees
    pub heading_deg: f64,
}

/// Output of a single dispatched sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerUpdate {
    Speed(SpeedReading),
    Heading(HeadingReading),
}

/// Lifecycle and sensor events
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A session began
    Started,
    /// The running session ended and its state was discarded
    Stopped,
    /// An optional source was dropped for the rest of the session
    SensorDropped { sensor: SensorKind, error: SensorError },
}

/// Per-session counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerStats {
    pub fixes_received: u32,
    pub acceleration_samples: u32,
    pub orientation_samples: u32,
    /// Updates skipped because a source reported a recoverable error
    pub transient_errors: u32,
    /// Samples that contributed nothing (bad coordinates, no elapsed time)
    pub degenerate_samples: u32,
    pub last_fix_timestamp_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_sensor_errors_map_to_boundary_errors() {
        assert_eq!(
            TrackerError::from_sensor(SensorKind::Position, &SensorError::Unavailable),
            Some(TrackerError::SensorUnavailable { sensor: SensorKind::Position })
        );
        assert_eq!(
            TrackerError::from_sensor(SensorKind::Motion, &SensorError::PermissionDenied),
            Some(TrackerError::SensorDenied { sensor: SensorKind::Motion })
        );
        assert_eq!(
            TrackerError::from_sensor(SensorKind::Position, &SensorError::SignalLost),
            None
        );
    }

    #[test]
    fn test_error_messages() {
        let err = TrackerError::SensorDenied { sensor: SensorKind::Position };
        assert_eq!(err.to_string(), "position sensor permission denied");
    }

    #[test]
    fn test_reading_serializes_in_knots() {
        let reading = SpeedReading {
            speed_knots: 5.5,
            course_deg: None,
            timestamp_ms: Some(1_000),
            source: SpeedSource::PositionFix,
        };
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["speed_knots"], 5.5);
        assert_eq!(json["source"], "position_fix");
    }
}
