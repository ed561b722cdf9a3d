//! Reservation entity model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cinema_core::types::{ReservationId, ScreeningId, UserId};

use super::seat::ReservedSeat;
use super::status::ReservationStatus;

/// A user's booking of one or more seats for a screening.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Booking user.
    pub user_id: UserId,
    /// Booked screening.
    pub screening_id: ScreeningId,
    /// Screening price multiplied by seat count.
    pub total_price: Decimal,
    /// Lifecycle state.
    pub status: ReservationStatus,
    /// Unique, immutable code handed to the customer.
    pub confirmation_code: String,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation last changed status.
    pub updated_at: DateTime<Utc>,
}

/// Data required to insert a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Booking user.
    pub user_id: UserId,
    /// Booked screening.
    pub screening_id: ScreeningId,
    /// Total price.
    pub total_price: Decimal,
    /// Generated confirmation code.
    pub confirmation_code: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A reservation together with the seats it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    /// The reservation row.
    #[serde(flatten)]
    pub reservation: Reservation,
    /// Its seats, ordered by row then seat.
    pub seats: Vec<ReservedSeat>,
}
