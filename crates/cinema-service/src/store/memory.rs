//! In-memory booking store using a Tokio mutex, for tests and embedding.
//!
//! A transaction holds the store's mutex for its whole lifetime and works
//! on a private copy of the state. `commit` writes the copy back; dropping
//! the transaction discards it. This gives the same all-or-nothing and
//! serialisation guarantees as the row locks of the PostgreSQL store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use cinema_core::error::AppError;
use cinema_core::result::AppResult;
use cinema_core::types::{
    HallId, MovieId, ReservationId, ReservedSeatId, ScreeningId, SeatPosition, UserId,
};
use cinema_entity::hall::{CinemaHall, HallType};
use cinema_entity::movie::Movie;
use cinema_entity::reservation::{
    NewReservation, Reservation, ReservationStatistics, ReservationStatus, ReservedSeat,
};
use cinema_entity::screening::{NewScreening, Screening, ScreeningChanges};
use cinema_entity::user::{User, UserRole};

use super::{BookingStore, BookingTx};

/// Per-table id sequences.
#[derive(Debug, Clone, Default)]
struct Sequences {
    user: i64,
    movie: i64,
    hall: i64,
    screening: i64,
    reservation: i64,
    seat: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

/// Internal state for the memory store.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    sequences: Sequences,
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
    halls: BTreeMap<HallId, CinemaHall>,
    screenings: BTreeMap<ScreeningId, Screening>,
    reservations: BTreeMap<ReservationId, Reservation>,
    seats: BTreeMap<ReservedSeatId, ReservedSeat>,
}

impl MemoryState {
    fn sorted_screenings<F>(&self, filter: F) -> Vec<Screening>
    where
        F: Fn(&Screening) -> bool,
    {
        let mut screenings: Vec<Screening> = self
            .screenings
            .values()
            .filter(|&s| filter(s))
            .cloned()
            .collect();
        screenings.sort_by_key(|s| (s.start_time, s.id));
        screenings
    }

    fn active_positions(&self, screening_id: ScreeningId) -> Vec<SeatPosition> {
        let mut positions: Vec<SeatPosition> = self
            .seats
            .values()
            .filter(|s| s.screening_id == screening_id && s.active)
            .map(ReservedSeat::position)
            .collect();
        positions.sort();
        positions
    }

    fn seats_of(&self, reservation_id: ReservationId) -> Vec<ReservedSeat> {
        let mut seats: Vec<ReservedSeat> = self
            .seats
            .values()
            .filter(|s| s.reservation_id == reservation_id)
            .cloned()
            .collect();
        seats.sort_by_key(|s| (s.row_number, s.seat_number));
        seats
    }
}

/// In-memory booking store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBookingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user.
    pub async fn add_user(&self, username: &str, role: UserRole) -> User {
        let mut state = self.state.lock().await;
        let id = UserId::new(next(&mut state.sequences.user));
        let user = User {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role,
            created_at: Utc::now(),
        };
        state.users.insert(id, user.clone());
        user
    }

    /// Register a movie.
    pub async fn add_movie(&self, title: &str, duration_minutes: i32) -> Movie {
        let mut state = self.state.lock().await;
        let id = MovieId::new(next(&mut state.sequences.movie));
        let movie = Movie {
            id,
            title: title.to_string(),
            duration_minutes,
        };
        state.movies.insert(id, movie.clone());
        movie
    }

    /// Register a hall with a `rows` x `seats_per_row` layout.
    pub async fn add_hall(
        &self,
        name: &str,
        rows: i32,
        seats_per_row: i32,
        hall_type: HallType,
    ) -> CinemaHall {
        let mut state = self.state.lock().await;
        let id = HallId::new(next(&mut state.sequences.hall));
        let hall = CinemaHall {
            id,
            name: name.to_string(),
            rows,
            seats_per_row,
            total_seats: rows * seats_per_row,
            hall_type,
        };
        state.halls.insert(id, hall.clone());
        hall
    }

    #[cfg(test)]
    pub(crate) async fn overwrite_available_seats(&self, id: ScreeningId, available: i32) {
        let mut state = self.state.lock().await;
        if let Some(screening) = state.screenings.get_mut(&id) {
            screening.available_seats = available;
        }
    }

    #[cfg(test)]
    pub(crate) async fn overwrite_status(&self, id: ReservationId, status: ReservationStatus) {
        let mut state = self.state.lock().await;
        if let Some(reservation) = state.reservations.get_mut(&id) {
            reservation.status = status;
        }
    }
}

/// An open in-memory transaction. Dropping it rolls back.
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> AppResult<MemoryTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find_screening(&self, id: ScreeningId) -> AppResult<Option<Screening>> {
        Ok(self.state.lock().await.screenings.get(&id).cloned())
    }

    async fn list_screenings(&self) -> AppResult<Vec<Screening>> {
        Ok(self.state.lock().await.sorted_screenings(|_| true))
    }

    async fn list_screenings_by_movie(&self, movie_id: MovieId) -> AppResult<Vec<Screening>> {
        Ok(self
            .state
            .lock()
            .await
            .sorted_screenings(|s| s.movie_id == movie_id))
    }

    async fn list_upcoming_screenings(&self, now: DateTime<Utc>) -> AppResult<Vec<Screening>> {
        Ok(self
            .state
            .lock()
            .await
            .sorted_screenings(|s| s.start_time >= now && !s.is_sold_out()))
    }

    async fn list_screenings_with_available_seats(
        &self,
        min_seats: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Screening>> {
        Ok(self
            .state
            .lock()
            .await
            .sorted_screenings(|s| s.start_time >= now && s.available_seats >= min_seats))
    }

    async fn occupied_seats(&self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>> {
        Ok(self.state.lock().await.active_positions(screening_id))
    }

    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.reservations.get(&id).cloned())
    }

    async fn find_reservation_by_code(&self, code: &str) -> AppResult<Option<Reservation>> {
        Ok(self
            .state
            .lock()
            .await
            .reservations
            .values()
            .find(|r| r.confirmation_code == code)
            .cloned())
    }

    async fn list_reservations_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(reservations)
    }

    async fn list_reservations_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut reservations: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.screening_id == screening_id)
            .cloned()
            .collect();
        reservations.sort_by_key(|r| (r.created_at, r.id));
        Ok(reservations)
    }

    async fn reserved_seats_of(
        &self,
        reservation_ids: &[ReservationId],
    ) -> AppResult<Vec<ReservedSeat>> {
        let state = self.state.lock().await;
        let mut seats: Vec<ReservedSeat> = state
            .seats
            .values()
            .filter(|s| reservation_ids.contains(&s.reservation_id))
            .cloned()
            .collect();
        seats.sort_by_key(|s| (s.reservation_id, s.row_number, s.seat_number));
        Ok(seats)
    }

    async fn reservation_statistics(
        &self,
        today_start: DateTime<Utc>,
        revenue_since: DateTime<Utc>,
        created_since: DateTime<Utc>,
    ) -> AppResult<ReservationStatistics> {
        let state = self.state.lock().await;
        let confirmed = |r: &&Reservation| r.status == ReservationStatus::Confirmed;

        let confirmed_today = state
            .reservations
            .values()
            .filter(confirmed)
            .filter(|r| r.created_at >= today_start)
            .count();
        let revenue_last_30_days: Decimal = state
            .reservations
            .values()
            .filter(confirmed)
            .filter(|r| r.created_at >= revenue_since)
            .map(|r| r.total_price)
            .sum();
        let created_last_7_days = state
            .reservations
            .values()
            .filter(|r| r.created_at >= created_since)
            .count();

        Ok(ReservationStatistics {
            confirmed_today: confirmed_today as i64,
            revenue_last_30_days,
            created_last_7_days: created_last_7_days as i64,
        })
    }
}

#[async_trait]
impl BookingTx for MemoryTx {
    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn find_movie(&mut self, id: MovieId) -> AppResult<Option<Movie>> {
        Ok(self.working.movies.get(&id).cloned())
    }

    async fn find_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>> {
        Ok(self.working.halls.get(&id).cloned())
    }

    async fn lock_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>> {
        Ok(self.working.halls.get(&id).cloned())
    }

    async fn lock_screening(&mut self, id: ScreeningId) -> AppResult<Option<Screening>> {
        Ok(self.working.screenings.get(&id).cloned())
    }

    async fn find_conflicting_screenings(
        &mut self,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<Vec<Screening>> {
        Ok(self.working.sorted_screenings(|s| {
            s.hall_id == hall_id && Some(s.id) != exclude && s.overlaps(start, end)
        }))
    }

    async fn insert_screening(&mut self, data: &NewScreening) -> AppResult<Screening> {
        let id = ScreeningId::new(next(&mut self.working.sequences.screening));
        let screening = Screening {
            id,
            movie_id: data.movie_id,
            hall_id: data.hall_id,
            start_time: data.start_time,
            end_time: data.end_time,
            price: data.price,
            capacity: data.capacity,
            available_seats: data.capacity,
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.working.screenings.insert(id, screening.clone());
        Ok(screening)
    }

    async fn update_screening(
        &mut self,
        id: ScreeningId,
        changes: &ScreeningChanges,
    ) -> AppResult<Screening> {
        let screening = self
            .working
            .screenings
            .get_mut(&id)
            .ok_or_else(|| AppError::screening_not_found(format!("Screening {id} not found")))?;
        screening.hall_id = changes.hall_id;
        screening.start_time = changes.start_time;
        screening.end_time = changes.end_time;
        screening.price = changes.price;
        screening.capacity = changes.capacity;
        screening.available_seats = changes.available_seats;
        screening.updated_at = changes.updated_at;
        Ok(screening.clone())
    }

    async fn delete_screening(&mut self, id: ScreeningId) -> AppResult<bool> {
        if self.working.screenings.remove(&id).is_none() {
            return Ok(false);
        }
        self.working.reservations.retain(|_, r| r.screening_id != id);
        self.working.seats.retain(|_, s| s.screening_id != id);
        Ok(true)
    }

    async fn set_available_seats(&mut self, id: ScreeningId, available: i32) -> AppResult<()> {
        if let Some(screening) = self.working.screenings.get_mut(&id) {
            screening.available_seats = available;
        }
        Ok(())
    }

    async fn seat_exists(
        &mut self,
        screening_id: ScreeningId,
        seat: SeatPosition,
    ) -> AppResult<bool> {
        Ok(self
            .working
            .seats
            .values()
            .any(|s| s.screening_id == screening_id && s.active && s.position() == seat))
    }

    async fn active_seats(&mut self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>> {
        Ok(self.working.active_positions(screening_id))
    }

    async fn insert_reservation(&mut self, data: &NewReservation) -> AppResult<Reservation> {
        if self
            .working
            .reservations
            .values()
            .any(|r| r.confirmation_code == data.confirmation_code)
        {
            return Err(AppError::internal("Confirmation code collision"));
        }
        let id = ReservationId::new(next(&mut self.working.sequences.reservation));
        let reservation = Reservation {
            id,
            user_id: data.user_id,
            screening_id: data.screening_id,
            total_price: data.total_price,
            status: ReservationStatus::Pending,
            confirmation_code: data.confirmation_code.clone(),
            created_at: data.created_at,
            updated_at: data.created_at,
        };
        self.working.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    async fn insert_reserved_seats(
        &mut self,
        reservation: &Reservation,
        seats: &[SeatPosition],
    ) -> AppResult<Vec<ReservedSeat>> {
        let taken = self.working.active_positions(reservation.screening_id);
        let mut inserted = Vec::with_capacity(seats.len());
        for (index, seat) in seats.iter().enumerate() {
            if taken.contains(seat) || seats[..index].contains(seat) {
                return Err(AppError::seat_not_available(
                    "One or more selected seats were taken by another reservation",
                ));
            }
            let id = ReservedSeatId::new(next(&mut self.working.sequences.seat));
            let reserved = ReservedSeat {
                id,
                reservation_id: reservation.id,
                screening_id: reservation.screening_id,
                row_number: seat.row_number,
                seat_number: seat.seat_number,
                active: true,
                created_at: reservation.created_at,
            };
            self.working.seats.insert(id, reserved.clone());
            inserted.push(reserved);
        }
        inserted.sort_by_key(|s| (s.row_number, s.seat_number));
        Ok(inserted)
    }

    async fn lock_reservation(&mut self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.working.reservations.get(&id).cloned())
    }

    async fn find_reserved_seats(
        &mut self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ReservedSeat>> {
        Ok(self.working.seats_of(reservation_id))
    }

    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        let reservation = self
            .working
            .reservations
            .get_mut(&id)
            .ok_or_else(|| AppError::reservation_not_found(format!("Reservation {id} not found")))?;
        reservation.status = status;
        reservation.updated_at = updated_at;
        Ok(reservation.clone())
    }

    async fn release_reserved_seats(&mut self, reservation_id: ReservationId) -> AppResult<u64> {
        let mut released = 0;
        for seat in self
            .working
            .seats
            .values_mut()
            .filter(|s| s.reservation_id == reservation_id && s.active)
        {
            seat.active = false;
            released += 1;
        }
        Ok(released)
    }

    async fn commit(self) -> AppResult<()> {
        let MemoryTx { mut guard, working } = self;
        *guard = working;
        Ok(())
    }
}
