//! Storage boundary for the booking core.
//!
//! [`BookingStore`] exposes read-only queries over committed state and
//! opens [`BookingTx`] units of work. Every mutation of screenings,
//! reservations, or seats happens through a `BookingTx` and becomes visible
//! only on [`BookingTx::commit`]. Dropping a transaction without committing
//! rolls it back.
//!
//! Two implementations are provided:
//! - PostgreSQL ([`PgBookingStore`]), using `SELECT ... FOR UPDATE` row locks
//! - In-memory ([`MemoryBookingStore`]), serialising transactions behind a
//!   `tokio::sync::Mutex`

pub mod memory;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cinema_core::result::AppResult;
use cinema_core::types::{
    HallId, MovieId, ReservationId, ScreeningId, SeatPosition, UserId,
};
use cinema_entity::hall::CinemaHall;
use cinema_entity::movie::Movie;
use cinema_entity::reservation::{
    NewReservation, Reservation, ReservationStatistics, ReservationStatus, ReservedSeat,
};
use cinema_entity::screening::{NewScreening, Screening, ScreeningChanges};
use cinema_entity::user::User;

pub use memory::{MemoryBookingStore, MemoryTx};
pub use postgres::{PgBookingStore, PgTx};

/// Read access to committed booking state plus transaction creation.
#[async_trait]
pub trait BookingStore: Send + Sync + Debug + 'static {
    /// The unit-of-work type produced by [`BookingStore::begin`].
    type Tx: BookingTx;

    /// Open a new transaction.
    async fn begin(&self) -> AppResult<Self::Tx>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<()>;

    /// Find a screening by ID.
    async fn find_screening(&self, id: ScreeningId) -> AppResult<Option<Screening>>;

    /// All screenings ordered by start time.
    async fn list_screenings(&self) -> AppResult<Vec<Screening>>;

    /// Screenings of a movie ordered by start time.
    async fn list_screenings_by_movie(&self, movie_id: MovieId) -> AppResult<Vec<Screening>>;

    /// Screenings starting at or after `now` with at least one seat left.
    async fn list_upcoming_screenings(&self, now: DateTime<Utc>) -> AppResult<Vec<Screening>>;

    /// Screenings starting at or after `now` with at least `min_seats` seats left.
    async fn list_screenings_with_available_seats(
        &self,
        min_seats: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Screening>>;

    /// Positions of the active seats of a screening.
    async fn occupied_seats(&self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>>;

    /// Find a reservation by ID.
    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// Find a reservation by confirmation code.
    async fn find_reservation_by_code(&self, code: &str) -> AppResult<Option<Reservation>>;

    /// A user's reservations, newest first.
    async fn list_reservations_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;

    /// A screening's reservations, oldest first.
    async fn list_reservations_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<Reservation>>;

    /// Seats of the given reservations (active or not), ordered by
    /// reservation, row, and seat.
    async fn reserved_seats_of(
        &self,
        reservation_ids: &[ReservationId],
    ) -> AppResult<Vec<ReservedSeat>>;

    /// Reservation counters over windows starting at the given instants.
    async fn reservation_statistics(
        &self,
        today_start: DateTime<Utc>,
        revenue_since: DateTime<Utc>,
        created_since: DateTime<Utc>,
    ) -> AppResult<ReservationStatistics>;
}

/// A single all-or-nothing unit of work.
#[async_trait]
pub trait BookingTx: Send + Sized {
    /// Find a user by ID.
    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>>;

    /// Find a movie by ID.
    async fn find_movie(&mut self, id: MovieId) -> AppResult<Option<Movie>>;

    /// Find a hall by ID.
    async fn find_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>>;

    /// Find a hall by ID and hold its lock until the transaction ends.
    async fn lock_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>>;

    /// Find a screening by ID and hold its lock until the transaction ends.
    async fn lock_screening(&mut self, id: ScreeningId) -> AppResult<Option<Screening>>;

    /// Screenings in the hall overlapping `[start, end]` (inclusive),
    /// excluding `exclude`.
    async fn find_conflicting_screenings(
        &mut self,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<Vec<Screening>>;

    /// Insert a screening; the counter starts at its capacity.
    async fn insert_screening(&mut self, data: &NewScreening) -> AppResult<Screening>;

    /// Overwrite a screening's mutable fields.
    async fn update_screening(
        &mut self,
        id: ScreeningId,
        changes: &ScreeningChanges,
    ) -> AppResult<Screening>;

    /// Delete a screening together with its reservations and seats.
    async fn delete_screening(&mut self, id: ScreeningId) -> AppResult<bool>;

    /// Set a screening's available-seat counter.
    async fn set_available_seats(&mut self, id: ScreeningId, available: i32) -> AppResult<()>;

    /// Whether an active seat exists at `seat`.
    async fn seat_exists(&mut self, screening_id: ScreeningId, seat: SeatPosition)
    -> AppResult<bool>;

    /// Positions of the active seats of a screening.
    async fn active_seats(&mut self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>>;

    /// Insert a PENDING reservation.
    async fn insert_reservation(&mut self, data: &NewReservation) -> AppResult<Reservation>;

    /// Insert active seats owned by the reservation.
    ///
    /// Fails with `SeatNotAvailable` when a seat is already active.
    async fn insert_reserved_seats(
        &mut self,
        reservation: &Reservation,
        seats: &[SeatPosition],
    ) -> AppResult<Vec<ReservedSeat>>;

    /// Find a reservation by ID and hold its lock until the transaction ends.
    async fn lock_reservation(&mut self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// Seats owned by a reservation.
    async fn find_reserved_seats(
        &mut self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ReservedSeat>>;

    /// Set a reservation's status.
    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Reservation>;

    /// Mark a reservation's seats inactive; returns how many were active.
    async fn release_reserved_seats(&mut self, reservation_id: ReservationId) -> AppResult<u64>;

    /// Make every change of this transaction visible.
    async fn commit(self) -> AppResult<()>;
}
