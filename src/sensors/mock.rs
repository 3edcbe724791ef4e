//! Scripted sensor sources for testing and simulation
//!
//! A `MockSource` is a cheap handle over shared state: clone it before
//! boxing it into a tracker and keep the clone to feed samples or inspect
//! the subscription from outside.

use crate::core::{AccelerationSample, GeoPosition, OrientationSample};
use crate::sensors::{
    MotionSource, OrientationSource, PositionOptions, PositionSource, SensorError, SensorResult,
};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

pub type MockPositionSource = MockSource<GeoPosition>;
pub type MockMotionSource = MockSource<AccelerationSample>;
pub type MockOrientationSource = MockSource<OrientationSample>;

struct MockState<T> {
    queue: VecDeque<SensorResult<T>>,
    available: bool,
    permission_granted: bool,
    subscribed: bool,
    subscribe_count: u32,
    last_options: Option<PositionOptions>,
    simulate_errors: bool,
    error_probability: f32,
}

/// Mock sensor source backed by a queue of scripted readings
pub struct MockSource<T> {
    state: Arc<Mutex<MockState<T>>>,
}

impl<T> Clone for MockSource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for MockSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MockSource<T> {
    /// Create an available, permitted, unsubscribed source with an empty queue
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                queue: VecDeque::new(),
                available: true,
                permission_granted: true,
                subscribed: false,
                subscribe_count: 0,
                last_options: None,
                simulate_errors: false,
                error_probability: 0.0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a reading
    pub fn push(&self, sample: T) {
        self.lock().queue.push_back(Ok(sample));
    }

    /// Queue a failure in place of a reading
    pub fn push_error(&self, error: SensorError) {
        self.lock().queue.push_back(Err(error));
    }

    /// Make the capability missing (or present again)
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Refuse permission; an active subscription fails on its next read
    pub fn revoke_permission(&self) {
        self.lock().permission_granted = false;
    }

    pub fn grant_permission(&self) {
        self.lock().permission_granted = true;
    }

    /// Enable random timeouts with given probability (0.0 to 1.0)
    pub fn simulate_errors(&self, enable: bool, probability: f32) {
        let mut state = self.lock();
        state.simulate_errors = enable;
        state.error_probability = probability.clamp(0.0, 1.0);
    }

    pub fn subscribed(&self) -> bool {
        self.lock().subscribed
    }

    pub fn subscribe_count(&self) -> u32 {
        self.lock().subscribe_count
    }

    pub fn last_options(&self) -> Option<PositionOptions> {
        self.lock().last_options
    }

    pub fn queued_count(&self) -> usize {
        self.lock().queue.len()
    }

    fn do_subscribe(&self, options: Option<PositionOptions>) -> SensorResult<()> {
        let mut state = self.lock();
        if !state.available {
            return Err(SensorError::Unavailable);
        }
        if !state.permission_granted {
            return Err(SensorError::PermissionDenied);
        }
        state.subscribed = true;
        state.subscribe_count += 1;
        state.last_options = options;
        Ok(())
    }

    fn do_unsubscribe(&self) {
        self.lock().subscribed = false;
    }

    fn do_read(&self) -> SensorResult<Option<T>> {
        let mut state = self.lock();
        if !state.subscribed {
            return Ok(None);
        }
        if !state.permission_granted {
            return Err(SensorError::PermissionDenied);
        }
        if state.simulate_errors && rand::thread_rng().gen::<f32>() < state.error_probability {
            return Err(SensorError::Timeout {
                timeout_ms: state.last_options.map_or(0, |o| o.timeout_ms),
            });
        }
        state.queue.pop_front().transpose()
    }
}

impl PositionSource for MockSource<GeoPosition> {
    fn subscribe(&mut self, options: &PositionOptions) -> SensorResult<()> {
        self.do_subscribe(Some(*options))
    }

    fn unsubscribe(&mut self) {
        self.do_unsubscribe();
    }

    fn read_fix(&mut self) -> SensorResult<Option<GeoPosition>> {
        self.do_read()
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed()
    }
}

impl MotionSource for MockSource<AccelerationSample> {
    fn subscribe(&mut self) -> SensorResult<()> {
        self.do_subscribe(None)
    }

    fn unsubscribe(&mut self) {
        self.do_unsubscribe();
    }

    fn read_sample(&mut self) -> SensorResult<Option<AccelerationSample>> {
        self.do_read()
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed()
    }
}

impl OrientationSource for MockSource<OrientationSample> {
    fn subscribe(&mut self) -> SensorResult<()> {
        self.do_subscribe(None)
    }

    fn unsubscribe(&mut self) {
        self.do_unsubscribe();
    }

    fn read_sample(&mut self) -> SensorResult<Option<OrientationSample>> {
        self.do_read()
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed()
    }
}
