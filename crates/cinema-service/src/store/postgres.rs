//! PostgreSQL-backed booking store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::{
    HallId, MovieId, ReservationId, ScreeningId, SeatPosition, UserId,
};
use cinema_database::DatabasePool;
use cinema_database::repositories::{
    ACTIVE_SEAT_CONSTRAINT, HallRepository, MovieRepository, ReservationRepository,
    ReservedSeatRepository, ScreeningRepository, UserRepository,
};
use cinema_entity::hall::CinemaHall;
use cinema_entity::movie::Movie;
use cinema_entity::reservation::{
    NewReservation, Reservation, ReservationStatistics, ReservationStatus, ReservedSeat,
};
use cinema_entity::screening::{NewScreening, Screening, ScreeningChanges};
use cinema_entity::user::User;

use super::{BookingStore, BookingTx};

/// Booking store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    db: DatabasePool,
    screenings: ScreeningRepository,
    reservations: ReservationRepository,
    seats: ReservedSeatRepository,
}

impl PgBookingStore {
    /// Creates a store over the given pool.
    pub fn new(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            screenings: ScreeningRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            seats: ReservedSeatRepository::new(pool),
            db,
        }
    }
}

/// An open PostgreSQL transaction. Dropping it rolls back.
#[derive(Debug)]
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingStore for PgBookingStore {
    type Tx = PgTx;

    async fn begin(&self) -> AppResult<PgTx> {
        let tx = self.db.pool().begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(PgTx { tx })
    }

    async fn health_check(&self) -> AppResult<()> {
        self.db.health_check().await
    }

    async fn find_screening(&self, id: ScreeningId) -> AppResult<Option<Screening>> {
        self.screenings.find_by_id(id).await
    }

    async fn list_screenings(&self) -> AppResult<Vec<Screening>> {
        self.screenings.find_all().await
    }

    async fn list_screenings_by_movie(&self, movie_id: MovieId) -> AppResult<Vec<Screening>> {
        self.screenings.find_by_movie(movie_id).await
    }

    async fn list_upcoming_screenings(&self, now: DateTime<Utc>) -> AppResult<Vec<Screening>> {
        self.screenings.find_upcoming(now).await
    }

    async fn list_screenings_with_available_seats(
        &self,
        min_seats: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Screening>> {
        self.screenings.find_with_available_seats(min_seats, now).await
    }

    async fn occupied_seats(&self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>> {
        self.seats.find_active_positions(screening_id).await
    }

    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        self.reservations.find_by_id(id).await
    }

    async fn find_reservation_by_code(&self, code: &str) -> AppResult<Option<Reservation>> {
        self.reservations.find_by_confirmation_code(code).await
    }

    async fn list_reservations_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        self.reservations.find_by_user(user_id).await
    }

    async fn list_reservations_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<Reservation>> {
        self.reservations.find_by_screening(screening_id).await
    }

    async fn reserved_seats_of(
        &self,
        reservation_ids: &[ReservationId],
    ) -> AppResult<Vec<ReservedSeat>> {
        match reservation_ids {
            [] => Ok(Vec::new()),
            [single] => self.seats.find_by_reservation(*single).await,
            many => self.seats.find_by_reservations(many).await,
        }
    }

    async fn reservation_statistics(
        &self,
        today_start: DateTime<Utc>,
        revenue_since: DateTime<Utc>,
        created_since: DateTime<Utc>,
    ) -> AppResult<ReservationStatistics> {
        self.reservations
            .statistics(today_start, revenue_since, created_since)
            .await
    }
}

#[async_trait]
impl BookingTx for PgTx {
    async fn find_user(&mut self, id: UserId) -> AppResult<Option<User>> {
        UserRepository::find_by_id_in(&mut self.tx, id).await
    }

    async fn find_movie(&mut self, id: MovieId) -> AppResult<Option<Movie>> {
        MovieRepository::find_by_id_in(&mut self.tx, id).await
    }

    async fn find_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>> {
        HallRepository::find_by_id_in(&mut self.tx, id).await
    }

    async fn lock_hall(&mut self, id: HallId) -> AppResult<Option<CinemaHall>> {
        HallRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn lock_screening(&mut self, id: ScreeningId) -> AppResult<Option<Screening>> {
        ScreeningRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn find_conflicting_screenings(
        &mut self,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<Vec<Screening>> {
        ScreeningRepository::find_conflicting(&mut self.tx, hall_id, start, end, exclude).await
    }

    async fn insert_screening(&mut self, data: &NewScreening) -> AppResult<Screening> {
        ScreeningRepository::insert(&mut self.tx, data).await
    }

    async fn update_screening(
        &mut self,
        id: ScreeningId,
        changes: &ScreeningChanges,
    ) -> AppResult<Screening> {
        ScreeningRepository::update(&mut self.tx, id, changes).await
    }

    async fn delete_screening(&mut self, id: ScreeningId) -> AppResult<bool> {
        ScreeningRepository::delete(&mut self.tx, id).await
    }

    async fn set_available_seats(&mut self, id: ScreeningId, available: i32) -> AppResult<()> {
        ScreeningRepository::set_available_seats(&mut self.tx, id, available).await
    }

    async fn seat_exists(
        &mut self,
        screening_id: ScreeningId,
        seat: SeatPosition,
    ) -> AppResult<bool> {
        ReservedSeatRepository::exists_active(&mut self.tx, screening_id, seat).await
    }

    async fn active_seats(&mut self, screening_id: ScreeningId) -> AppResult<Vec<SeatPosition>> {
        ReservedSeatRepository::find_active_positions_in(&mut self.tx, screening_id).await
    }

    async fn insert_reservation(&mut self, data: &NewReservation) -> AppResult<Reservation> {
        ReservationRepository::insert(&mut self.tx, data).await
    }

    async fn insert_reserved_seats(
        &mut self,
        reservation: &Reservation,
        seats: &[SeatPosition],
    ) -> AppResult<Vec<ReservedSeat>> {
        ReservedSeatRepository::insert_many(
            &mut self.tx,
            reservation.id,
            reservation.screening_id,
            seats,
            reservation.created_at,
        )
        .await
    }

    async fn lock_reservation(&mut self, id: ReservationId) -> AppResult<Option<Reservation>> {
        ReservationRepository::lock_by_id(&mut self.tx, id).await
    }

    async fn find_reserved_seats(
        &mut self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ReservedSeat>> {
        ReservedSeatRepository::find_by_reservation_in(&mut self.tx, reservation_id).await
    }

    async fn update_reservation_status(
        &mut self,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        ReservationRepository::update_status(&mut self.tx, id, status, updated_at).await
    }

    async fn release_reserved_seats(&mut self, reservation_id: ReservationId) -> AppResult<u64> {
        ReservedSeatRepository::deactivate_by_reservation(&mut self.tx, reservation_id).await
    }

    async fn commit(self) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(ACTIVE_SEAT_CONSTRAINT) =>
            {
                AppError::seat_not_available(
                    "One or more selected seats were taken by another reservation",
                )
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e),
        })
    }
}
