//! Session API and output formatting
//!
//! `SpeedTracker` is the single entry point hosts talk to: start a session
//! with a set of sensor sources, push or pull samples, and read speed in
//! knots and heading in degrees through getters or callbacks.

pub mod tracker;
pub mod types;
pub mod formatting;

// Re-export commonly used API types
pub use types::{
    HeadingReading, RestartPolicy, SpeedReading, SpeedSource, TrackerError, TrackerEvent,
    TrackerResult, TrackerStats, TrackerUpdate,
};
pub use tracker::{
    CallbackHandle, EventCallback, HeadingCallback, SpeedCallback, SpeedTracker, TrackingSession,
};
pub use formatting::{
    CsvFormatter, FormattedReading, JsonFormatter, OutputFormat, ReadingFormatter, TextFormatter,
};
