use crate::algorithms::geo_math::normalize_degrees;
use crate::core::OrientationSample;

/// Latest heading reported by the orientation source
///
/// No smoothing: every sample replaces the previous heading.
#[derive(Debug, Clone, Default)]
pub struct HeadingTracker {
    heading_deg: f64,
}

impl HeadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample and return the heading wrapped into [0, 360)
    ///
    /// A missing or non-finite heading reads as 0.
    pub fn update_heading(&mut self, sample: &OrientationSample) -> f64 {
        self.heading_deg = match sample.heading_degrees {
            Some(deg) if deg.is_finite() => normalize_degrees(deg),
            _ => 0.0,
        };
        self.heading_deg
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading_deg
    }

    pub fn reset(&mut self) {
        self.heading_deg = 0.0;
    }
}
