//! Blending of fix-derived and inertial speed into one estimate
//!
//! Two policies are available:
//!
//! - [`BlendPolicy::SharedBaseline`]: one shared speed value. Acceleration
//!   samples integrate into it, and each fix replaces it with the average of
//!   itself and the fix-derived speed. Whichever stream spoke last sets the
//!   baseline the next blend starts from.
//! - [`BlendPolicy::SeparateSources`]: the last fix-derived speed and the
//!   inertial running speed are kept apart and averaged when reported.
//!
//! In both cases the first fix of a session anchors the estimate at zero.

use crate::algorithms::fix_speed::velocity_from_fixes;
use crate::algorithms::geo_math::is_reportable_speed;
use crate::core::{AccelerationSample, GeoPosition};
use crate::processing::inertial::InertialIntegrator;
use serde::{Deserialize, Serialize};

/// Weight given to the newest fix-derived speed in the shared blend
const FIX_BLEND_WEIGHT: f64 = 0.5;

/// How positional and inertial speed are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendPolicy {
    SharedBaseline,
    SeparateSources,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        BlendPolicy::SharedBaseline
    }
}

/// Result of feeding one fix to the estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionUpdate {
    /// Blended speed after the update (m/s)
    pub speed_mps: f64,
    /// Course over ground implied by the last two fixes
    pub course_deg: Option<f64>,
    /// The fix contributed nothing (bad coordinates or no elapsed time)
    pub degenerate: bool,
}

/// Owner of the session's speed estimate
#[derive(Debug, Clone)]
pub struct FusionEstimator {
    policy: BlendPolicy,
    last_position: Option<GeoPosition>,
    last_position_timestamp_ms: u64,
    blended_speed_mps: f64,
    last_fix_speed_mps: Option<f64>,
    inertial_seen: bool,
    last_course_deg: Option<f64>,
    integrator: InertialIntegrator,
}

impl Default for FusionEstimator {
    fn default() -> Self {
        Self::new(BlendPolicy::default(), InertialIntegrator::default())
    }
}

impl FusionEstimator {
    pub fn new(policy: BlendPolicy, integrator: InertialIntegrator) -> Self {
        Self {
            policy,
            last_position: None,
            last_position_timestamp_ms: 0,
            blended_speed_mps: 0.0,
            last_fix_speed_mps: None,
            inertial_seen: false,
            last_course_deg: None,
            integrator,
        }
    }

    /// Blend a new fix into the estimate and return the speed (m/s)
    pub fn on_position_fix(&mut self, fix: GeoPosition) -> f64 {
        self.update_with_fix(fix).speed_mps
    }

    /// Blend a new fix and report what happened
    pub fn update_with_fix(&mut self, fix: GeoPosition) -> FusionUpdate {
        let first_fix = self.last_position.is_none();
        let valid = fix.is_valid();

        let previous = if valid { self.last_position.as_ref() } else { None };
        let velocity = velocity_from_fixes(previous, &fix);
        let mut degenerate = !valid || (!first_fix && self.elapsed_ms(&fix) <= 0);

        if first_fix {
            // no prior fix to compare against: anchor the session at rest
            self.blended_speed_mps = 0.0;
            self.integrator.set_speed_mps(0.0);
            self.last_fix_speed_mps = Some(0.0);
            self.inertial_seen = false;
        } else {
            match self.policy {
                BlendPolicy::SharedBaseline => {
                    let blended = FIX_BLEND_WEIGHT * velocity.speed_mps
                        + (1.0 - FIX_BLEND_WEIGHT) * self.blended_speed_mps;
                    if is_reportable_speed(blended) {
                        self.blended_speed_mps = blended;
                        self.integrator.set_speed_mps(blended);
                    } else {
                        degenerate = true;
                    }
                }
                BlendPolicy::SeparateSources => {
                    self.last_fix_speed_mps = Some(velocity.speed_mps);
                    self.blended_speed_mps = self.separate_estimate();
                }
            }
        }

        if valid {
            self.last_position = Some(fix);
            self.last_position_timestamp_ms = fix.timestamp_ms;
            self.last_course_deg = velocity.course_deg.or(self.last_course_deg);
        }

        FusionUpdate {
            speed_mps: self.blended_speed_mps,
            course_deg: self.last_course_deg,
            degenerate,
        }
    }

    /// Integrate an acceleration sample and return the speed (m/s)
    ///
    /// Degenerate samples leave the estimate unchanged.
    pub fn on_acceleration_sample(&mut self, sample: &AccelerationSample) -> f64 {
        self.update_with_acceleration(sample).unwrap_or(self.blended_speed_mps)
    }

    /// Integrate an acceleration sample; `None` when it was degenerate
    pub fn update_with_acceleration(&mut self, sample: &AccelerationSample) -> Option<f64> {
        let running = self.integrator.integrate_sample(sample)?;
        self.inertial_seen = true;
        self.blended_speed_mps = match self.policy {
            BlendPolicy::SharedBaseline => running,
            BlendPolicy::SeparateSources => self.separate_estimate(),
        };
        Some(self.blended_speed_mps)
    }

    fn separate_estimate(&self) -> f64 {
        let inertial = self.integrator.speed_mps();
        match (self.last_fix_speed_mps, self.inertial_seen) {
            (Some(fix), true) => (fix + inertial) / 2.0,
            (Some(fix), false) => fix,
            (None, true) => inertial,
            (None, false) => 0.0,
        }
    }

    fn elapsed_ms(&self, fix: &GeoPosition) -> i128 {
        fix.timestamp_ms as i128 - self.last_position_timestamp_ms as i128
    }

    /// Current blended speed (m/s)
    pub fn speed_mps(&self) -> f64 {
        self.blended_speed_mps
    }

    pub fn last_position(&self) -> Option<&GeoPosition> {
        self.last_position.as_ref()
    }

    pub fn last_position_timestamp_ms(&self) -> u64 {
        self.last_position_timestamp_ms
    }

    pub fn course_deg(&self) -> Option<f64> {
        self.last_course_deg
    }

    pub fn policy(&self) -> BlendPolicy {
        self.policy
    }

    /// Return to the empty state of a fresh session
    pub fn reset(&mut self) {
        self.last_position = None;
        self.last_position_timestamp_ms = 0;
        self.blended_speed_mps = 0.0;
        self.last_fix_speed_mps = None;
        self.inertial_seen = false;
        self.last_course_deg = None;
        self.integrator.reset();
    }
}
