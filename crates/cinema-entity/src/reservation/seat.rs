//! Reserved seat entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cinema_core::types::{ReservationId, ReservedSeatId, ScreeningId, SeatPosition};

/// One physical seat booked for a screening under a reservation.
///
/// Rows are never deleted on cancellation; `active` is cleared instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReservedSeat {
    /// Unique reserved seat identifier.
    pub id: ReservedSeatId,
    /// Owning reservation.
    pub reservation_id: ReservationId,
    /// Screening the seat is booked for.
    pub screening_id: ScreeningId,
    /// Row number.
    pub row_number: i32,
    /// Seat number within the row.
    pub seat_number: i32,
    /// Whether the seat still blocks other bookings.
    pub active: bool,
    /// When the seat was booked.
    pub created_at: DateTime<Utc>,
}

impl ReservedSeat {
    /// The seat's coordinates.
    pub fn position(&self) -> SeatPosition {
        SeatPosition::new(self.row_number, self.seat_number)
    }
}
