//! Cinema hall repository implementation.

use sqlx::PgConnection;

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::HallId;
use cinema_entity::hall::CinemaHall;

/// Read-only access to halls, plus the hall row lock that serializes
/// scheduling in one hall.
#[derive(Debug, Clone, Copy, Default)]
pub struct HallRepository;

impl HallRepository {
    /// Find a hall by ID inside an open transaction.
    pub async fn find_by_id_in(
        conn: &mut PgConnection,
        id: HallId,
    ) -> AppResult<Option<CinemaHall>> {
        sqlx::query_as::<_, CinemaHall>("SELECT * FROM cinema_halls WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find hall", e))
    }

    /// Lock a hall row (`FOR UPDATE`) and return it.
    ///
    /// Holding this lock while conflict-checking keeps two concurrent
    /// schedulers from both placing a screening in the same slot.
    pub async fn lock_by_id(conn: &mut PgConnection, id: HallId) -> AppResult<Option<CinemaHall>> {
        sqlx::query_as::<_, CinemaHall>("SELECT * FROM cinema_halls WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock hall", e))
    }
}
