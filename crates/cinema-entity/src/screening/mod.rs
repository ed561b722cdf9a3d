//! Screening entities.

pub mod availability;
pub mod model;

pub use availability::ScreeningAvailability;
pub use model::{NewScreening, Screening, ScreeningChanges};
