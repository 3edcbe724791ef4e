//! Sensor abstraction layer
//!
//! The estimator never talks to platform sensors directly. Hosts hand it
//! boxed sources implementing the traits below, one per capability.

pub mod source;
pub mod error;
pub mod mock;

pub use source::{
    ExternalFeed, MotionSource, OrientationSource, PositionOptions, PositionSource, SensorKind,
};
pub use error::{Recovery, SensorError, SensorResult};
pub use mock::{MockMotionSource, MockOrientationSource, MockPositionSource, MockSource};
