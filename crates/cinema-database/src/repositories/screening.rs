//! Screening repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::{HallId, MovieId, ScreeningId};
use cinema_entity::screening::{NewScreening, Screening, ScreeningChanges};

/// Repository for screenings and their available-seat counter.
#[derive(Debug, Clone)]
pub struct ScreeningRepository {
    pool: PgPool,
}

impl ScreeningRepository {
    /// Create a new screening repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a screening by ID.
    pub async fn find_by_id(&self, id: ScreeningId) -> AppResult<Option<Screening>> {
        select_by_id(&self.pool, id).await
    }

    /// List all screenings ordered by start time.
    pub async fn find_all(&self) -> AppResult<Vec<Screening>> {
        sqlx::query_as::<_, Screening>("SELECT * FROM screenings ORDER BY start_time, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list screenings", e))
    }

    /// List screenings of a movie ordered by start time.
    pub async fn find_by_movie(&self, movie_id: MovieId) -> AppResult<Vec<Screening>> {
        sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings WHERE movie_id = $1 ORDER BY start_time, id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list screenings by movie", e)
        })
    }

    /// Screenings starting at or after `now` that still have seats.
    pub async fn find_upcoming(&self, now: DateTime<Utc>) -> AppResult<Vec<Screening>> {
        sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings WHERE start_time >= $1 AND available_seats > 0 \
             ORDER BY start_time, id",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list upcoming screenings", e)
        })
    }

    /// Screenings starting at or after `now` with at least `min_seats` seats left.
    pub async fn find_with_available_seats(
        &self,
        min_seats: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Screening>> {
        sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings WHERE available_seats >= $1 AND start_time >= $2 \
             ORDER BY start_time, id",
        )
        .bind(min_seats)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list screenings with available seats",
                e,
            )
        })
    }

    /// Lock a screening row (`FOR UPDATE`) before reading its counter.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: ScreeningId,
    ) -> AppResult<Option<Screening>> {
        sqlx::query_as::<_, Screening>("SELECT * FROM screenings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock screening", e))
    }

    /// Screenings in `hall_id` overlapping `[start, end]` with inclusive
    /// boundaries, excluding `exclude` when given.
    pub async fn find_conflicting(
        conn: &mut PgConnection,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<Vec<Screening>> {
        sqlx::query_as::<_, Screening>(
            "SELECT * FROM screenings \
             WHERE hall_id = $1 \
               AND ((start_time BETWEEN $2 AND $3) \
                 OR (end_time BETWEEN $2 AND $3) \
                 OR ($2 BETWEEN start_time AND end_time)) \
               AND ($4::BIGINT IS NULL OR id <> $4) \
             ORDER BY start_time, id",
        )
        .bind(hall_id)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to check screening conflicts",
                e,
            )
        })
    }

    /// Insert a screening with its counter initialised to capacity.
    pub async fn insert(conn: &mut PgConnection, data: &NewScreening) -> AppResult<Screening> {
        sqlx::query_as::<_, Screening>(
            "INSERT INTO screenings \
                (movie_id, hall_id, start_time, end_time, price, capacity, available_seats, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $7) \
             RETURNING *",
        )
        .bind(data.movie_id)
        .bind(data.hall_id)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.price)
        .bind(data.capacity)
        .bind(data.created_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create screening", e))
    }

    /// Overwrite the mutable fields of a screening.
    pub async fn update(
        conn: &mut PgConnection,
        id: ScreeningId,
        changes: &ScreeningChanges,
    ) -> AppResult<Screening> {
        sqlx::query_as::<_, Screening>(
            "UPDATE screenings SET hall_id = $2, start_time = $3, end_time = $4, price = $5, \
                    capacity = $6, available_seats = $7, updated_at = $8 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(changes.hall_id)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.price)
        .bind(changes.capacity)
        .bind(changes.available_seats)
        .bind(changes.updated_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update screening", e))?
        .ok_or_else(|| AppError::screening_not_found(format!("Screening {id} not found")))
    }

    /// Set the available-seat counter.
    pub async fn set_available_seats(
        conn: &mut PgConnection,
        id: ScreeningId,
        available_seats: i32,
    ) -> AppResult<()> {
        sqlx::query("UPDATE screenings SET available_seats = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(available_seats)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to update available seats",
                    e,
                )
            })?;
        Ok(())
    }

    /// Delete a screening; reservations and seats cascade.
    pub async fn delete(conn: &mut PgConnection, id: ScreeningId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM screenings WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete screening", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}

async fn select_by_id<'e, E>(executor: E, id: ScreeningId) -> AppResult<Option<Screening>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Screening>("SELECT * FROM screenings WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find screening", e))
}
