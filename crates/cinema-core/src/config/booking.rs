//! Reservation business-rule configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Limits applied by the reservation lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Maximum number of seats a single reservation may hold.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_reservation: usize,
    /// Cancellation is refused when the screening starts within this many minutes.
    #[serde(default = "default_cutoff_minutes")]
    pub cancellation_cutoff_minutes: i64,
}

impl BookingConfig {
    /// The cancellation cutoff as a duration.
    pub fn cancellation_cutoff(&self) -> Duration {
        Duration::minutes(self.cancellation_cutoff_minutes)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_seats_per_reservation: default_max_seats(),
            cancellation_cutoff_minutes: default_cutoff_minutes(),
        }
    }
}

fn default_max_seats() -> usize {
    10
}

fn default_cutoff_minutes() -> i64 {
    120
}
