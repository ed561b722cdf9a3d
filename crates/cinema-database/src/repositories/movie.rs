//! Movie repository implementation.

use sqlx::PgConnection;

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::MovieId;
use cinema_entity::movie::Movie;

/// Read-only access to the movie catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovieRepository;

impl MovieRepository {
    /// Find a movie by ID inside an open transaction.
    pub async fn find_by_id_in(conn: &mut PgConnection, id: MovieId) -> AppResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>("SELECT * FROM movies WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find movie", e))
    }
}
