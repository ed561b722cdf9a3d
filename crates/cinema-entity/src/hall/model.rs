//! Cinema hall entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cinema_core::types::{HallId, SeatPosition};

use super::hall_type::HallType;

/// A physical auditorium with a rectangular seat layout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CinemaHall {
    /// Unique hall identifier.
    pub id: HallId,
    /// Display name.
    pub name: String,
    /// Number of seat rows.
    pub rows: i32,
    /// Number of seats in each row.
    pub seats_per_row: i32,
    /// Total seats, the capacity given to screenings in this hall.
    pub total_seats: i32,
    /// Hall format.
    pub hall_type: HallType,
}

impl CinemaHall {
    /// Whether `seat` exists in this hall's layout.
    pub fn contains(&self, seat: &SeatPosition) -> bool {
        seat.fits(self.rows, self.seats_per_row)
    }
}
