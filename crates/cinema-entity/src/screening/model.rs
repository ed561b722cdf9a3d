//! Screening entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cinema_core::types::{HallId, MovieId, ScreeningId};

/// A showing of a movie in a hall during `[start_time, end_time)`.
///
/// `available_seats` always equals `capacity` minus the number of active
/// reserved seats for this screening.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Screening {
    /// Unique screening identifier.
    pub id: ScreeningId,
    /// The movie being shown.
    pub movie_id: MovieId,
    /// The hall it is shown in.
    pub hall_id: HallId,
    /// Start of the showing.
    pub start_time: DateTime<Utc>,
    /// End of the showing.
    pub end_time: DateTime<Utc>,
    /// Price per seat.
    pub price: Decimal,
    /// Hall total seats at the time the screening was (re)assigned.
    pub capacity: i32,
    /// Seats not held by a pending or confirmed reservation.
    pub available_seats: i32,
    /// When the screening was created.
    pub created_at: DateTime<Utc>,
    /// When the screening was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Screening {
    /// Whether this screening overlaps `[start, end]`.
    ///
    /// Boundaries are inclusive: a screening ending exactly when the other
    /// starts is a conflict.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        (self.start_time >= start && self.start_time <= end)
            || (self.end_time >= start && self.end_time <= end)
            || (start >= self.start_time && start <= self.end_time)
    }

    /// Whether the screening is sold out.
    pub fn is_sold_out(&self) -> bool {
        self.available_seats <= 0
    }
}

/// Data required to insert a screening.
#[derive(Debug, Clone)]
pub struct NewScreening {
    /// The movie being shown.
    pub movie_id: MovieId,
    /// The hall it is shown in.
    pub hall_id: HallId,
    /// Start of the showing.
    pub start_time: DateTime<Utc>,
    /// End of the showing.
    pub end_time: DateTime<Utc>,
    /// Price per seat.
    pub price: Decimal,
    /// Seat capacity; the counter starts at this value.
    pub capacity: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Field values written when a screening is updated.
#[derive(Debug, Clone)]
pub struct ScreeningChanges {
    /// New hall.
    pub hall_id: HallId,
    /// New start.
    pub start_time: DateTime<Utc>,
    /// New end.
    pub end_time: DateTime<Utc>,
    /// New price per seat.
    pub price: Decimal,
    /// New capacity.
    pub capacity: i32,
    /// New available-seat counter.
    pub available_seats: i32,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, hour, 0, 0).single().expect("valid")
    }

    fn screening(start: u32, end: u32) -> Screening {
        Screening {
            id: ScreeningId::new(1),
            movie_id: MovieId::new(1),
            hall_id: HallId::new(1),
            start_time: at(start),
            end_time: at(end),
            price: Decimal::new(1550, 2),
            capacity: 100,
            available_seats: 100,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    #[test]
    fn test_overlap_partial() {
        assert!(screening(11, 13).overlaps(at(10), at(12)));
    }

    #[test]
    fn test_overlap_touching_boundary_conflicts() {
        assert!(screening(12, 14).overlaps(at(10), at(12)));
        assert!(screening(8, 10).overlaps(at(10), at(12)));
    }

    #[test]
    fn test_overlap_contained() {
        assert!(screening(9, 15).overlaps(at(10), at(12)));
        assert!(screening(10, 11).overlaps(at(9), at(15)));
    }

    #[test]
    fn test_no_overlap() {
        assert!(!screening(13, 15).overlaps(at(10), at(12)));
    }

    #[test]
    fn test_sold_out() {
        let mut s = screening(10, 12);
        assert!(!s.is_sold_out());
        s.available_seats = 0;
        assert!(s.is_sold_out());
    }
}
