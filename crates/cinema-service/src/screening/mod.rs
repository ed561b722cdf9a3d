//! Screening scheduling and administration.

pub mod scheduler;
pub mod service;

pub use scheduler::ScreeningScheduler;
pub use service::{CreateScreening, ScreeningService, UpdateScreening};
