//! Screening capacity tracking.

pub mod tracker;

pub use tracker::{CapacityReport, CapacityTracker};
