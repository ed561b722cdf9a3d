//! Which seats of a screening are taken.
//!
//! A seat is taken while an active reserved-seat row exists for it. The
//! storage layer enforces uniqueness of active seats; the checks here are a
//! fast path that reports the first conflicting seat by name.

use cinema_core::result::AppResult;
use cinema_core::types::{ReservationId, ScreeningId, SeatPosition};
use cinema_entity::reservation::{Reservation, ReservedSeat};

use crate::store::{BookingStore, BookingTx};

/// Records and queries seat occupancy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancyLedger;

impl OccupancyLedger {
    /// Creates a ledger.
    pub fn new() -> Self {
        Self
    }

    /// Whether an active reserved seat exists at `seat`.
    pub async fn is_occupied<T: BookingTx>(
        &self,
        tx: &mut T,
        screening_id: ScreeningId,
        seat: SeatPosition,
    ) -> AppResult<bool> {
        tx.seat_exists(screening_id, seat).await
    }

    /// The first of `seats` that is already taken, in request order.
    pub async fn first_occupied<T: BookingTx>(
        &self,
        tx: &mut T,
        screening_id: ScreeningId,
        seats: &[SeatPosition],
    ) -> AppResult<Option<SeatPosition>> {
        for seat in seats {
            if self.is_occupied(tx, screening_id, *seat).await? {
                return Ok(Some(*seat));
            }
        }
        Ok(None)
    }

    /// Insert one active seat per position, owned by `reservation`.
    pub async fn record_seats<T: BookingTx>(
        &self,
        tx: &mut T,
        reservation: &Reservation,
        seats: &[SeatPosition],
    ) -> AppResult<Vec<ReservedSeat>> {
        tx.insert_reserved_seats(reservation, seats).await
    }

    /// Mark a reservation's seats inactive. Returns how many were released.
    pub async fn release_seats<T: BookingTx>(
        &self,
        tx: &mut T,
        reservation_id: ReservationId,
    ) -> AppResult<u64> {
        tx.release_reserved_seats(reservation_id).await
    }

    /// Committed set of taken seats of a screening.
    pub async fn occupied_seats<S: BookingStore>(
        &self,
        store: &S,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<SeatPosition>> {
        store.occupied_seats(screening_id).await
    }
}
