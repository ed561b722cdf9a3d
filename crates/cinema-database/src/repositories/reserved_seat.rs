//! Reserved seat repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::{ReservationId, ScreeningId, SeatPosition};
use cinema_entity::reservation::ReservedSeat;

/// Name of the partial unique index over active seats.
pub const ACTIVE_SEAT_CONSTRAINT: &str = "uq_reserved_seats_active";

/// Repository for the seat occupancy rows.
#[derive(Debug, Clone)]
pub struct ReservedSeatRepository {
    pool: PgPool,
}

impl ReservedSeatRepository {
    /// Create a new reserved seat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seats owned by a reservation, active or not.
    pub async fn find_by_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ReservedSeat>> {
        select_by_reservation(&self.pool, reservation_id).await
    }

    /// Seats owned by any of the given reservations.
    pub async fn find_by_reservations(
        &self,
        reservation_ids: &[ReservationId],
    ) -> AppResult<Vec<ReservedSeat>> {
        let ids: Vec<i64> = reservation_ids.iter().map(|id| id.value()).collect();
        sqlx::query_as::<_, ReservedSeat>(
            "SELECT * FROM reserved_seats WHERE reservation_id = ANY($1) \
             ORDER BY reservation_id, row_number, seat_number",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reserved seats", e))
    }

    /// Positions of the active seats of a screening.
    pub async fn find_active_positions(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<SeatPosition>> {
        select_active_positions(&self.pool, screening_id).await
    }

    /// Positions of the active seats of a screening, inside an open transaction.
    pub async fn find_active_positions_in(
        conn: &mut PgConnection,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<SeatPosition>> {
        select_active_positions(&mut *conn, screening_id).await
    }

    /// Seats owned by a reservation, inside an open transaction.
    pub async fn find_by_reservation_in(
        conn: &mut PgConnection,
        reservation_id: ReservationId,
    ) -> AppResult<Vec<ReservedSeat>> {
        select_by_reservation(&mut *conn, reservation_id).await
    }

    /// Whether an active seat exists at `seat` for the screening.
    pub async fn exists_active(
        conn: &mut PgConnection,
        screening_id: ScreeningId,
        seat: SeatPosition,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reserved_seats \
             WHERE screening_id = $1 AND row_number = $2 AND seat_number = $3 AND active)",
        )
        .bind(screening_id)
        .bind(seat.row_number)
        .bind(seat.seat_number)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check seat", e))
    }

    /// Insert one active seat per position for the reservation.
    ///
    /// A clash with the active-seat index surfaces as `SeatNotAvailable`.
    pub async fn insert_many(
        conn: &mut PgConnection,
        reservation_id: ReservationId,
        screening_id: ScreeningId,
        seats: &[SeatPosition],
        created_at: DateTime<Utc>,
    ) -> AppResult<Vec<ReservedSeat>> {
        let rows: Vec<i32> = seats.iter().map(|s| s.row_number).collect();
        let numbers: Vec<i32> = seats.iter().map(|s| s.seat_number).collect();

        let mut inserted = sqlx::query_as::<_, ReservedSeat>(
            "INSERT INTO reserved_seats \
                (reservation_id, screening_id, row_number, seat_number, active, created_at) \
             SELECT $1, $2, r, s, TRUE, $5 FROM UNNEST($3::INT[], $4::INT[]) AS t(r, s) \
             RETURNING *",
        )
        .bind(reservation_id)
        .bind(screening_id)
        .bind(rows)
        .bind(numbers)
        .bind(created_at)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(ACTIVE_SEAT_CONSTRAINT) =>
            {
                AppError::seat_not_available(
                    "One or more selected seats were taken by another reservation",
                )
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to record seats", e),
        })?;

        inserted.sort_by_key(|s| (s.row_number, s.seat_number));
        Ok(inserted)
    }

    /// Mark every seat of a reservation inactive. Returns the number of
    /// seats released.
    pub async fn deactivate_by_reservation(
        conn: &mut PgConnection,
        reservation_id: ReservationId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reserved_seats SET active = FALSE WHERE reservation_id = $1 AND active",
        )
        .bind(reservation_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release seats", e))?;
        Ok(result.rows_affected())
    }
}

async fn select_by_reservation<'e, E>(
    executor: E,
    reservation_id: ReservationId,
) -> AppResult<Vec<ReservedSeat>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ReservedSeat>(
        "SELECT * FROM reserved_seats WHERE reservation_id = $1 ORDER BY row_number, seat_number",
    )
    .bind(reservation_id)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reserved seats", e))
}

async fn select_active_positions<'e, E>(
    executor: E,
    screening_id: ScreeningId,
) -> AppResult<Vec<SeatPosition>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, (i32, i32)>(
        "SELECT row_number, seat_number FROM reserved_seats \
         WHERE screening_id = $1 AND active \
         ORDER BY row_number, seat_number",
    )
    .bind(screening_id)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list occupied seats", e))?;

    Ok(rows
        .into_iter()
        .map(|(row, seat)| SeatPosition::new(row, seat))
        .collect())
}
