use crate::algorithms::geo_math::is_reportable_speed;
use crate::core::{AccelerationSample, MAX_SAMPLE_INTERVAL_S, NOMINAL_SAMPLE_INTERVAL_S};
use serde::{Deserialize, Serialize};

/// How the integration step is chosen for each acceleration sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// Always integrate over the nominal interval
    Nominal,
    /// Use the gap between sample timestamps when both are known and the
    /// gap is a plausible sensor rate, otherwise fall back to the nominal
    /// interval
    PreferMeasured,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        IntervalPolicy::PreferMeasured
    }
}

/// Running speed obtained by integrating acceleration over time
///
/// No clamping is applied: the value drifts and may go negative. A
/// positional source is expected to pull it back through fusion.
#[derive(Debug, Clone)]
pub struct InertialIntegrator {
    running_speed_mps: f64,
    nominal_interval_s: f64,
    policy: IntervalPolicy,
    last_sample_timestamp_ms: Option<u64>,
}

impl Default for InertialIntegrator {
    fn default() -> Self {
        Self::new(NOMINAL_SAMPLE_INTERVAL_S, IntervalPolicy::default())
    }
}

impl InertialIntegrator {
    pub fn new(nominal_interval_s: f64, policy: IntervalPolicy) -> Self {
        Self {
            running_speed_mps: 0.0,
            nominal_interval_s,
            policy,
            last_sample_timestamp_ms: None,
        }
    }

    /// Add `sample * delta_time_s` to the running speed and return it
    ///
    /// A non-positive or non-finite step, or a result that would not stay
    /// finite in knots, leaves the running speed untouched.
    pub fn integrate(&mut self, sample: &AccelerationSample, delta_time_s: f64) -> f64 {
        self.step(sample.vertical_component, delta_time_s);
        self.running_speed_mps
    }

    /// Integrate a sample using the configured interval policy
    ///
    /// Returns `None` when the sample is degenerate (non-finite reading or
    /// a measured interval that does not advance) and was ignored.
    pub fn integrate_sample(&mut self, sample: &AccelerationSample) -> Option<f64> {
        if !sample.vertical_component.is_finite() {
            return None;
        }
        let dt = self.resolve_interval(sample)?;
        self.step(sample.vertical_component, dt)
    }

    fn step(&mut self, acceleration: f64, delta_time_s: f64) -> Option<f64> {
        if !(delta_time_s > 0.0 && delta_time_s.is_finite()) {
            return None;
        }
        let next = self.running_speed_mps + acceleration * delta_time_s;
        if !next.is_finite() || !is_reportable_speed(next) {
            return None;
        }
        self.running_speed_mps = next;
        Some(next)
    }

    fn resolve_interval(&mut self, sample: &AccelerationSample) -> Option<f64> {
        let measured = match (self.policy, sample.timestamp_ms, self.last_sample_timestamp_ms) {
            (IntervalPolicy::PreferMeasured, Some(now), Some(last)) => {
                Some((now as f64 - last as f64) / 1000.0)
            }
            _ => None,
        };

        match measured {
            Some(dt) if dt <= 0.0 => None,
            Some(dt) if dt > MAX_SAMPLE_INTERVAL_S => {
                // stalled source: one sample does not span the whole gap
                self.last_sample_timestamp_ms = sample.timestamp_ms;
                Some(self.nominal_interval_s)
            }
            Some(dt) => {
                self.last_sample_timestamp_ms = sample.timestamp_ms;
                Some(dt)
            }
            None => {
                if sample.timestamp_ms.is_some() {
                    self.last_sample_timestamp_ms = sample.timestamp_ms;
                }
                Some(self.nominal_interval_s)
            }
        }
    }

    /// Current running speed (m/s)
    pub fn speed_mps(&self) -> f64 {
        self.running_speed_mps
    }

    /// Rebase the running speed, e.g. after a positional blend
    pub fn set_speed_mps(&mut self, speed_mps: f64) {
        self.running_speed_mps = if is_reportable_speed(speed_mps) { speed_mps } else { 0.0 };
    }

    pub fn nominal_interval_s(&self) -> f64 {
        self.nominal_interval_s
    }

    pub fn policy(&self) -> IntervalPolicy {
        self.policy
    }

    /// Forget speed and timing history
    pub fn reset(&mut self) {
        self.running_speed_mps = 0.0;
        self.last_sample_timestamp_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::geo_math::mps_to_knots;
    use approx::assert_relative_eq;

    #[test]
    fn test_integration_accumulates() {
        let mut integrator = InertialIntegrator::default();
        let sample = AccelerationSample::new(2.0);

        assert_relative_eq!(integrator.integrate(&sample, 0.5), 1.0);
        assert_relative_eq!(integrator.integrate(&sample, 0.5), 2.0);
        assert_relative_eq!(integrator.speed_mps(), 2.0);
    }

    #[test]
    fn test_integration_is_linear() {
        let a = 0.7;
        let k = 3.5;
        let dt = 0.25;

        let mut base = InertialIntegrator::default();
        let mut scaled = InertialIntegrator::default();
        let delta = base.integrate(&AccelerationSample::new(a), dt);
        let scaled_delta = scaled.integrate(&AccelerationSample::new(k * a), dt);

        assert_relative_eq!(scaled_delta, k * delta, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_speed_is_not_clamped() {
        let mut integrator = InertialIntegrator::default();
        let speed = integrator.integrate(&AccelerationSample::new(-4.0), 1.0);
        assert_relative_eq!(speed, -4.0);
    }

    #[test]
    fn test_degenerate_steps_are_ignored() {
        let mut integrator = InertialIntegrator::default();
        integrator.set_speed_mps(3.0);

        assert_eq!(integrator.integrate(&AccelerationSample::new(1.0), 0.0), 3.0);
        assert_eq!(integrator.integrate(&AccelerationSample::new(1.0), -1.0), 3.0);
        assert_eq!(integrator.integrate(&AccelerationSample::new(1.0), f64::NAN), 3.0);
        assert_eq!(integrator.integrate(&AccelerationSample::new(f64::INFINITY), 0.1), 3.0);
    }

    #[test]
    fn test_untimed_samples_use_nominal_interval() {
        let mut integrator = InertialIntegrator::new(0.1, IntervalPolicy::PreferMeasured);

        let speed = integrator.integrate_sample(&AccelerationSample::new(1.0)).unwrap();
        assert_relative_eq!(speed, 0.1);
    }

    #[test]
    fn test_measured_interval_is_preferred() {
        let mut integrator = InertialIntegrator::new(0.1, IntervalPolicy::PreferMeasured);

        // first timed sample has nothing to measure against
        let first = integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(1_000))
            .unwrap();
        assert_relative_eq!(first, 0.1);

        let second = integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(1_500))
            .unwrap();
        assert_relative_eq!(second, 0.6);
    }

    #[test]
    fn test_nominal_policy_ignores_timestamps() {
        let mut integrator = InertialIntegrator::new(0.2, IntervalPolicy::Nominal);

        integrator.integrate_sample(&AccelerationSample::new(1.0).with_timestamp(0));
        let speed = integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(5_000))
            .unwrap();
        assert_relative_eq!(speed, 0.4);
    }

    #[test]
    fn test_stale_timestamp_is_degenerate() {
        let mut integrator = InertialIntegrator::new(0.1, IntervalPolicy::PreferMeasured);
        integrator.integrate_sample(&AccelerationSample::new(1.0).with_timestamp(2_000));

        assert!(integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(2_000))
            .is_none());
        assert!(integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(1_000))
            .is_none());
        assert_relative_eq!(integrator.speed_mps(), 0.1);
    }

    #[test]
    fn test_long_gap_falls_back_to_nominal_interval() {
        let mut integrator = InertialIntegrator::new(0.1, IntervalPolicy::PreferMeasured);
        integrator.integrate_sample(&AccelerationSample::new(0.0).with_timestamp(0));

        // five minutes without motion samples
        let speed = integrator
            .integrate_sample(&AccelerationSample::new(0.2).with_timestamp(300_000))
            .unwrap();
        assert_relative_eq!(speed, 0.02);

        // timing resumes from the late sample
        let speed = integrator
            .integrate_sample(&AccelerationSample::new(0.2).with_timestamp(300_500))
            .unwrap();
        assert_relative_eq!(speed, 0.12);
    }

    #[test]
    fn test_speed_stays_finite_in_knots() {
        let mut integrator = InertialIntegrator::new(1.0, IntervalPolicy::Nominal);
        for _ in 0..10 {
            integrator.integrate_sample(&AccelerationSample::new(f64::MAX));
        }
        assert!(mps_to_knots(integrator.speed_mps()).is_finite());

        // f64::MAX m/s overflows once divided into knots
        assert!(integrator
            .integrate_sample(&AccelerationSample::new(f64::MAX))
            .is_none());
        integrator.set_speed_mps(f64::MAX);
        assert_eq!(integrator.speed_mps(), 0.0);
    }

    #[test]
    fn test_policy_accessors() {
        let integrator = InertialIntegrator::new(0.05, IntervalPolicy::Nominal);
        assert_eq!(integrator.policy(), IntervalPolicy::Nominal);
        assert_eq!(integrator.nominal_interval_s(), 0.05);
    }

    #[test]
    fn test_non_finite_reading_is_degenerate() {
        let mut integrator = InertialIntegrator::default();
        assert!(integrator.integrate_sample(&AccelerationSample::new(f64::NAN)).is_none());
        assert_eq!(integrator.speed_mps(), 0.0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut integrator = InertialIntegrator::default();
        integrator.integrate_sample(&AccelerationSample::new(5.0).with_timestamp(100));
        integrator.reset();

        assert_eq!(integrator.speed_mps(), 0.0);
        // no timing history: the next timed sample uses the nominal step again
        let speed = integrator
            .integrate_sample(&AccelerationSample::new(1.0).with_timestamp(10_000))
            .unwrap();
        assert_relative_eq!(speed, 0.1);
    }
}
