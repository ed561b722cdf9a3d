//! Reservation repository implementation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::{ReservationId, ScreeningId, UserId};
use cinema_entity::reservation::{
    NewReservation, Reservation, ReservationStatistics, ReservationStatus,
};

/// Repository for reservation rows.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find reservation", e)
            })
    }

    /// Find a reservation by its confirmation code.
    pub async fn find_by_confirmation_code(&self, code: &str) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE confirmation_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to find reservation by confirmation code",
                    e,
                )
            })
    }

    /// A user's reservations, newest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list user reservations", e)
        })
    }

    /// All reservations for a screening, oldest first.
    pub async fn find_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE screening_id = $1 ORDER BY created_at, id",
        )
        .bind(screening_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list screening reservations",
                e,
            )
        })
    }

    /// Aggregate counters over the given window starts.
    pub async fn statistics(
        &self,
        today_start: DateTime<Utc>,
        revenue_since: DateTime<Utc>,
        created_since: DateTime<Utc>,
    ) -> AppResult<ReservationStatistics> {
        let (confirmed_today, revenue_last_30_days, created_last_7_days) =
            sqlx::query_as::<_, (i64, Decimal, i64)>(
                "SELECT \
                    COUNT(*) FILTER (WHERE status = 'CONFIRMED' AND created_at >= $1), \
                    COALESCE(SUM(total_price) FILTER \
                        (WHERE status = 'CONFIRMED' AND created_at >= $2), 0), \
                    COUNT(*) FILTER (WHERE created_at >= $3) \
                 FROM reservations",
            )
            .bind(today_start)
            .bind(revenue_since)
            .bind(created_since)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to compute reservation statistics",
                    e,
                )
            })?;

        Ok(ReservationStatistics {
            confirmed_today,
            revenue_last_30_days,
            created_last_7_days,
        })
    }

    /// Insert a PENDING reservation.
    pub async fn insert(conn: &mut PgConnection, data: &NewReservation) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations \
                (user_id, screening_id, total_price, status, confirmation_code, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.screening_id)
        .bind(data.total_price)
        .bind(ReservationStatus::Pending)
        .bind(&data.confirmation_code)
        .bind(data.created_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("reservations_confirmation_code_key") =>
            {
                AppError::with_source(
                    ErrorKind::Internal,
                    "Confirmation code collision",
                    e,
                )
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create reservation", e),
        })
    }

    /// Lock a reservation row (`FOR UPDATE`) before a state transition.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: ReservationId,
    ) -> AppResult<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to lock reservation", e)
            })
    }

    /// Set the status of a reservation.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: ReservationId,
        status: ReservationStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(updated_at)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to update reservation status",
                e,
            )
        })?
        .ok_or_else(|| AppError::reservation_not_found(format!("Reservation {id} not found")))
    }
}
