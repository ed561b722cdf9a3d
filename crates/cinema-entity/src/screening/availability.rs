//! Seat availability view of a screening.

use serde::{Deserialize, Serialize};

use cinema_core::types::{ScreeningId, SeatPosition};

/// Capacity, remaining seats and the taken seat set of a screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningAvailability {
    /// The screening.
    pub screening_id: ScreeningId,
    /// Total seats.
    pub capacity: i32,
    /// Seats still free.
    pub available_seats: i32,
    /// Seats held by pending or confirmed reservations.
    pub occupied_seats: Vec<SeatPosition>,
}
