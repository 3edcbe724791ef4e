//! Callback-driven tracking session
//!
//! `SpeedTracker` owns the estimator state of one session. Samples reach it
//! either through the push handlers (`on_position_fix`, `on_acceleration`,
//! `on_orientation`, `dispatch`), called by the host's event loop, or
//! through `process`, which drains the subscribed sources. All entry points
//! take `&mut self`, so updates are applied one at a time in the order the
//! host delivers them.

use crate::algorithms::geo_math::mps_to_knots;
use crate::api::types::{
    HeadingReading, RestartPolicy, SpeedReading, SpeedSource, TrackerError, TrackerEvent,
    TrackerResult, TrackerStats, TrackerUpdate,
};
use crate::core::{AccelerationSample, GeoPosition, OrientationSample, SensorEvent};
use crate::processing::{FusionEstimator, HeadingTracker, InertialIntegrator};
use crate::sensors::{
    MotionSource, OrientationSource, PositionSource, Recovery, SensorError, SensorKind,
};
use crate::utils::config::TrackerConfig;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Callback function type for speed updates
pub type SpeedCallback = Box<dyn Fn(SpeedReading) + Send>;

/// Callback function type for heading updates
pub type HeadingCallback = Box<dyn Fn(HeadingReading) + Send>;

/// Callback function type for lifecycle events
pub type EventCallback = Box<dyn Fn(TrackerEvent) + Send>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Sensor sources for one tracking session
///
/// Position is mandatory; motion and orientation are optional and the
/// tracker runs on fixes alone without them.
pub struct TrackingSession {
    position: Box<dyn PositionSource>,
    motion: Option<Box<dyn MotionSource>>,
    orientation: Option<Box<dyn OrientationSource>>,
}

impl TrackingSession {
    pub fn new(position: Box<dyn PositionSource>) -> Self {
        Self {
            position,
            motion: None,
            orientation: None,
        }
    }

    pub fn with_motion(mut self, motion: Box<dyn MotionSource>) -> Self {
        self.motion = Some(motion);
        self
    }

    pub fn with_orientation(mut self, orientation: Box<dyn OrientationSource>) -> Self {
        self.orientation = Some(orientation);
        self
    }

    fn unsubscribe_all(&mut self) {
        self.position.unsubscribe();
        if let Some(motion) = self.motion.as_mut() {
            motion.unsubscribe();
        }
        if let Some(orientation) = self.orientation.as_mut() {
            orientation.unsubscribe();
        }
    }
}

/// Speed and heading tracker for one session at a time
pub struct SpeedTracker {
    config: TrackerConfig,
    fusion: FusionEstimator,
    heading: HeadingTracker,
    session: Option<TrackingSession>,
    stats: TrackerStats,
    callback_counter: u32,
    speed_callbacks: HashMap<CallbackHandle, SpeedCallback>,
    heading_callbacks: HashMap<CallbackHandle, HeadingCallback>,
    event_callbacks: HashMap<CallbackHandle, EventCallback>,
}

impl SpeedTracker {
    /// Create an idle tracker after validating `config`
    pub fn new(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: TrackerConfig) -> Self {
        let integrator =
            InertialIntegrator::new(config.nominal_sample_interval_s, config.interval_policy);
        Self {
            fusion: FusionEstimator::new(config.blend_policy, integrator),
            heading: HeadingTracker::new(),
            config,
            session: None,
            stats: TrackerStats::default(),
            callback_counter: 0,
            speed_callbacks: HashMap::new(),
            heading_callbacks: HashMap::new(),
            event_callbacks: HashMap::new(),
        }
    }

    /// Begin a session
    ///
    /// Fails with `SensorUnavailable`/`SensorDenied` when the position
    /// source cannot be subscribed; nothing starts in that case. Optional
    /// sources that fail to subscribe are dropped and tracking continues.
    pub fn start(&mut self, mut session: TrackingSession) -> TrackerResult<()> {
        if self.is_tracking() {
            match self.config.restart_policy {
                RestartPolicy::Ignore => {
                    debug!("start ignored: tracking already active");
                    return Ok(());
                }
                RestartPolicy::Reject => return Err(TrackerError::AlreadyTracking),
                RestartPolicy::Restart => {
                    info!("restarting active tracking session");
                    self.stop();
                }
            }
        }

        if let Err(error) = session.position.subscribe(&self.config.position_options) {
            warn!("position source failed to subscribe: {}", error);
            return Err(TrackerError::from_sensor(SensorKind::Position, &error)
                .unwrap_or(TrackerError::SensorUnavailable { sensor: SensorKind::Position }));
        }

        let mut dropped = Vec::new();
        if let Some(mut motion) = session.motion.take() {
            match motion.subscribe() {
                Ok(()) => session.motion = Some(motion),
                Err(error) => dropped.push((SensorKind::Motion, error)),
            }
        }
        if let Some(mut orientation) = session.orientation.take() {
            match orientation.subscribe() {
                Ok(()) => session.orientation = Some(orientation),
                Err(error) => dropped.push((SensorKind::Orientation, error)),
            }
        }

        self.fusion.reset();
        self.heading.reset();
        self.stats = TrackerStats::default();
        self.session = Some(session);
        info!("tracking started");
        self.trigger_event(TrackerEvent::Started);

        for (sensor, error) in dropped {
            info!("{} source unavailable ({}), continuing without it", sensor, error);
            self.trigger_event(TrackerEvent::SensorDropped { sensor, error });
        }
        Ok(())
    }

    /// End the session: unsubscribe every source and discard estimator state
    ///
    /// No-op when idle. Session counters stay readable until the next start.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            self.teardown(session);
        }
    }

    fn teardown(&mut self, mut session: TrackingSession) {
        session.unsubscribe_all();
        self.fusion.reset();
        self.heading.reset();
        info!("tracking stopped");
        self.trigger_event(TrackerEvent::Stopped);
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// Latest blended speed in knots (0 when idle)
    pub fn current_speed_knots(&self) -> f64 {
        mps_to_knots(self.fusion.speed_mps())
    }

    /// Latest heading in [0, 360) degrees (0 when idle)
    pub fn current_heading_degrees(&self) -> f64 {
        self.heading.heading_degrees()
    }

    pub fn stats(&self) -> &TrackerStats {
        &self.stats
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feed a positional fix; `None` while idle
    pub fn on_position_fix(&mut self, fix: GeoPosition) -> Option<SpeedReading> {
        if !self.is_tracking() {
            return None;
        }
        Some(self.apply_fix(fix))
    }

    /// Report a failed position update
    ///
    /// Recoverable errors are counted and skipped. Loss of the position
    /// source stops tracking and is returned once.
    pub fn on_position_error(&mut self, error: SensorError) -> TrackerResult<()> {
        match self.session.take() {
            Some(session) => self.apply_position_error(session, error),
            None => Ok(()),
        }
    }

    /// Feed an acceleration sample; `None` while idle or when the sample was degenerate
    pub fn on_acceleration(&mut self, sample: AccelerationSample) -> Option<SpeedReading> {
        if !self.is_tracking() {
            return None;
        }
        self.apply_acceleration(sample)
    }

    /// Feed an orientation sample; `None` while idle
    pub fn on_orientation(&mut self, sample: OrientationSample) -> Option<HeadingReading> {
        if !self.is_tracking() {
            return None;
        }
        Some(self.apply_orientation(sample))
    }

    /// Route any sample to its handler
    pub fn dispatch(&mut self, event: SensorEvent) -> Option<TrackerUpdate> {
        match event {
            SensorEvent::Position(fix) => self.on_position_fix(fix).map(TrackerUpdate::Speed),
            SensorEvent::Acceleration(sample) => {
                self.on_acceleration(sample).map(TrackerUpdate::Speed)
            }
            SensorEvent::Orientation(sample) => {
                self.on_orientation(sample).map(TrackerUpdate::Heading)
            }
        }
    }

    /// Drain every subscribed source, position first, then motion, then orientation
    ///
    /// Returns the number of samples applied. A recoverable error ends that
    /// source's turn for this call.
    pub fn process(&mut self) -> TrackerResult<usize> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => return Ok(0),
        };
        let mut processed = 0;

        loop {
            match session.position.read_fix() {
                Ok(Some(fix)) => {
                    self.apply_fix(fix);
                    processed += 1;
                }
                Ok(None) => break,
                Err(error) => match error.recovery() {
                    Recovery::Skip => {
                        self.record_transient(SensorKind::Position, &error);
                        break;
                    }
                    Recovery::Abort => {
                        return self.apply_position_error(session, error).map(|_| processed)
                    }
                },
            }
        }

        if let Some(mut motion) = session.motion.take() {
            let mut keep = true;
            loop {
                match motion.read_sample() {
                    Ok(Some(sample)) => {
                        self.apply_acceleration(sample);
                        processed += 1;
                    }
                    Ok(None) => break,
                    Err(error) => {
                        keep = self.handle_optional_error(SensorKind::Motion, error);
                        break;
                    }
                }
            }
            if keep {
                session.motion = Some(motion);
            } else {
                motion.unsubscribe();
            }
        }

        if let Some(mut orientation) = session.orientation.take() {
            let mut keep = true;
            loop {
                match orientation.read_sample() {
                    Ok(Some(sample)) => {
                        self.apply_orientation(sample);
                        processed += 1;
                    }
                    Ok(None) => break,
                    Err(error) => {
                        keep = self.handle_optional_error(SensorKind::Orientation, error);
                        break;
                    }
                }
            }
            if keep {
                session.orientation = Some(orientation);
            } else {
                orientation.unsubscribe();
            }
        }

        self.session = Some(session);
        Ok(processed)
    }

    fn apply_fix(&mut self, fix: GeoPosition) -> SpeedReading {
        self.stats.fixes_received = self.stats.fixes_received.saturating_add(1);
        let update = self.fusion.update_with_fix(fix);
        if update.degenerate {
            self.stats.degenerate_samples = self.stats.degenerate_samples.saturating_add(1);
            debug!("degenerate fix at {}ms contributed zero speed", fix.timestamp_ms);
        }
        if fix.is_valid() {
            self.stats.last_fix_timestamp_ms = Some(fix.timestamp_ms);
        }

        let reading = SpeedReading {
            speed_knots: mps_to_knots(update.speed_mps),
            course_deg: update.course_deg,
            timestamp_ms: Some(fix.timestamp_ms),
            source: SpeedSource::PositionFix,
        };
        self.trigger_speed_callbacks(reading);
        reading
    }

    fn apply_position_error(
        &mut self,
        session: TrackingSession,
        error: SensorError,
    ) -> TrackerResult<()> {
        match TrackerError::from_sensor(SensorKind::Position, &error) {
            Some(fatal) => {
                warn!("position source lost: {}", error);
                self.teardown(session);
                Err(fatal)
            }
            None => {
                self.record_transient(SensorKind::Position, &error);
                self.session = Some(session);
                Ok(())
            }
        }
    }

    fn apply_acceleration(&mut self, sample: AccelerationSample) -> Option<SpeedReading> {
        self.stats.acceleration_samples = self.stats.acceleration_samples.saturating_add(1);
        let speed_mps = match self.fusion.update_with_acceleration(&sample) {
            Some(speed) => speed,
            None => {
                self.stats.degenerate_samples = self.stats.degenerate_samples.saturating_add(1);
                debug!("degenerate acceleration sample ignored: {:?}", sample);
                return None;
            }
        };

        let reading = SpeedReading {
            speed_knots: mps_to_knots(speed_mps),
            course_deg: self.fusion.course_deg(),
            timestamp_ms: sample.timestamp_ms,
            source: SpeedSource::Inertial,
        };
        self.trigger_speed_callbacks(reading);
        Some(reading)
    }

    fn apply_orientation(&mut self, sample: OrientationSample) -> HeadingReading {
        self.stats.orientation_samples = self.stats.orientation_samples.saturating_add(1);
        let reading = HeadingReading {
            heading_deg: self.heading.update_heading(&sample),
        };
        self.trigger_heading_callbacks(reading);
        reading
    }

    fn record_transient(&mut self, sensor: SensorKind, error: &SensorError) {
        self.stats.transient_errors = self.stats.transient_errors.saturating_add(1);
        debug!("{} update skipped: {}", sensor, error);
    }

    /// Returns whether the optional source should be kept
    fn handle_optional_error(&mut self, sensor: SensorKind, error: SensorError) -> bool {
        match error.recovery() {
            Recovery::Skip => {
                self.record_transient(sensor, &error);
                true
            }
            Recovery::Abort => {
                info!("{} source dropped: {}", sensor, error);
                self.trigger_event(TrackerEvent::SensorDropped { sensor, error });
                false
            }
        }
    }

    fn next_handle(&mut self) -> CallbackHandle {
        self.callback_counter += 1;
        CallbackHandle(self.callback_counter)
    }

    /// Register a callback fired on every speed update
    pub fn register_speed_callback(&mut self, callback: SpeedCallback) -> CallbackHandle {
        let handle = self.next_handle();
        self.speed_callbacks.insert(handle, callback);
        handle
    }

    /// Register a callback fired on every heading update
    pub fn register_heading_callback(&mut self, callback: HeadingCallback) -> CallbackHandle {
        let handle = self.next_handle();
        self.heading_callbacks.insert(handle, callback);
        handle
    }

    /// Register a callback for lifecycle events
    pub fn register_event_callback(&mut self, callback: EventCallback) -> CallbackHandle {
        let handle = self.next_handle();
        self.event_callbacks.insert(handle, callback);
        handle
    }

    /// Remove a callback; false when the handle is unknown
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.speed_callbacks.remove(&handle).is_some()
            || self.heading_callbacks.remove(&handle).is_some()
            || self.event_callbacks.remove(&handle).is_some()
    }

    /// Number of registered (speed, heading, event) callbacks
    pub fn callback_count(&self) -> (usize, usize, usize) {
        (
            self.speed_callbacks.len(),
            self.heading_callbacks.len(),
            self.event_callbacks.len(),
        )
    }

    fn trigger_speed_callbacks(&self, reading: SpeedReading) {
        for callback in self.speed_callbacks.values() {
            callback(reading);
        }
    }

    fn trigger_heading_callbacks(&self, reading: HeadingReading) {
        for callback in self.heading_callbacks.values() {
            callback(reading);
        }
    }

    fn trigger_event(&self, event: TrackerEvent) {
        for callback in self.event_callbacks.values() {
            callback(event.clone());
        }
    }
}

impl Default for SpeedTracker {
    fn default() -> Self {
        Self::with_valid_config(TrackerConfig::default())
    }
}

impl Drop for SpeedTracker {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.unsubscribe_all();
        }
    }
}
