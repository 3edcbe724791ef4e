//! Sensor error types and recovery classification

/// Failure reported by a sensor source
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    /// Capability missing on this platform
    #[error("sensor not available")]
    Unavailable,
    /// User or platform refused access
    #[error("permission denied")]
    PermissionDenied,
    /// No reading arrived in time
    #[error("no reading within {timeout_ms}ms")]
    Timeout { timeout_ms: u32 },
    /// Signal temporarily lost
    #[error("signal lost")]
    SignalLost,
    /// Source produced something it could not decode
    #[error("invalid reading: {details}")]
    InvalidReading { details: String },
}

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;

/// What the tracker does after a sensor error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Drop this update and keep going
    Skip,
    /// The source is unusable for the rest of the session
    Abort,
}

impl SensorError {
    pub fn recovery(&self) -> Recovery {
        match self {
            SensorError::Unavailable => Recovery::Abort,
            SensorError::PermissionDenied => Recovery::Abort,
            SensorError::Timeout { .. } => Recovery::Skip,
            SensorError::SignalLost => Recovery::Skip,
            SensorError::InvalidReading { .. } => Recovery::Skip,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recovery() == Recovery::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_classification() {
        assert_eq!(SensorError::Unavailable.recovery(), Recovery::Abort);
        assert_eq!(SensorError::PermissionDenied.recovery(), Recovery::Abort);
        assert!(SensorError::Timeout { timeout_ms: 10_000 }.is_recoverable());
        assert!(SensorError::SignalLost.is_recoverable());
        assert!(SensorError::InvalidReading { details: "nmea".to_string() }.is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SensorError::Timeout { timeout_ms: 250 }.to_string(),
            "no reading within 250ms"
        );
    }
}
