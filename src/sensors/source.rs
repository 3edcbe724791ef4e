//! Sensor source traits and subscription options

use crate::core::{AccelerationSample, GeoPosition, OrientationSample};
use crate::sensors::SensorResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which capability a source provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Position,
    Motion,
    Orientation,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Position => write!(f, "position"),
            SensorKind::Motion => write!(f, "motion"),
            SensorKind::Orientation => write!(f, "orientation"),
        }
    }
}

/// Hints handed to the position source when tracking starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    /// Ask for the most accurate fix the platform can give
    pub high_accuracy: bool,
    /// Oldest cached fix the source may deliver (milliseconds)
    pub maximum_age_ms: u32,
    /// Longest wait for a single fix before reporting a timeout (milliseconds)
    pub timeout_ms: u32,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            maximum_age_ms: 1000,
            timeout_ms: 10_000,
        }
    }
}

/// Source of geographic fixes
pub trait PositionSource {
    /// Begin delivering fixes
    fn subscribe(&mut self, options: &PositionOptions) -> SensorResult<()>;

    /// Stop delivering fixes; idempotent
    fn unsubscribe(&mut self);

    /// Next pending fix
    /// Returns Ok(None) when nothing is pending (non-blocking)
    fn read_fix(&mut self) -> SensorResult<Option<GeoPosition>>;

    fn is_subscribed(&self) -> bool;
}

/// Source of acceleration samples
pub trait MotionSource {
    fn subscribe(&mut self) -> SensorResult<()>;

    fn unsubscribe(&mut self);

    /// Next pending sample, Ok(None) when nothing is pending
    fn read_sample(&mut self) -> SensorResult<Option<AccelerationSample>>;

    fn is_subscribed(&self) -> bool;
}

/// Source of orientation samples
pub trait OrientationSource {
    fn subscribe(&mut self) -> SensorResult<()>;

    fn unsubscribe(&mut self);

    /// Next pending sample, Ok(None) when nothing is pending
    fn read_sample(&mut self) -> SensorResult<Option<OrientationSample>>;

    fn is_subscribed(&self) -> bool;
}

/// Source whose samples the host delivers through the tracker's push handlers
///
/// Subscribing always succeeds and reads never yield anything; use it when
/// the platform's own event loop calls `on_position_fix` and friends.
#[derive(Debug, Clone, Default)]
pub struct ExternalFeed {
    subscribed: bool,
}

impl ExternalFeed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionSource for ExternalFeed {
    fn subscribe(&mut self, _options: &PositionOptions) -> SensorResult<()> {
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn read_fix(&mut self) -> SensorResult<Option<GeoPosition>> {
        Ok(None)
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl MotionSource for ExternalFeed {
    fn subscribe(&mut self) -> SensorResult<()> {
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn read_sample(&mut self) -> SensorResult<Option<AccelerationSample>> {
        Ok(None)
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl OrientationSource for ExternalFeed {
    fn subscribe(&mut self) -> SensorResult<()> {
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    fn read_sample(&mut self) -> SensorResult<Option<OrientationSample>> {
        Ok(None)
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}
