//! Stateful estimators fed one sample at a time

pub mod inertial;
pub mod fusion;
pub mod heading;

pub use inertial::{InertialIntegrator, IntervalPolicy};
pub use fusion::{BlendPolicy, FusionEstimator, FusionUpdate};
pub use heading::HeadingTracker;
