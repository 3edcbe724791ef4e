//! Core types and constants for speed and heading estimation

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
