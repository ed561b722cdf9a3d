//! Physical seat coordinates within a hall.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A seat identified by its 1-based row and seat number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPosition {
    /// Row number, starting at 1.
    pub row_number: i32,
    /// Seat number within the row, starting at 1.
    pub seat_number: i32,
}

impl SeatPosition {
    /// Create a seat position.
    pub const fn new(row_number: i32, seat_number: i32) -> Self {
        Self {
            row_number,
            seat_number,
        }
    }

    /// Both coordinates are at least 1.
    pub fn is_well_formed(&self) -> bool {
        self.row_number >= 1 && self.seat_number >= 1
    }

    /// Whether the seat lies inside a `rows` x `seats_per_row` layout.
    pub fn fits(&self, rows: i32, seats_per_row: i32) -> bool {
        self.is_well_formed() && self.row_number <= rows && self.seat_number <= seats_per_row
    }

    /// Human-readable label such as `A5` for row 1 seat 5.
    ///
    /// Rows past `Z` fall back to the numeric row.
    pub fn label(&self) -> String {
        match u8::try_from(self.row_number) {
            Ok(row @ 1..=26) => format!("{}{}", char::from(b'A' + row - 1), self.seat_number),
            _ => format!("R{}-{}", self.row_number, self.seat_number),
        }
    }
}

impl fmt::Display for SeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row_number, self.seat_number)
    }
}
