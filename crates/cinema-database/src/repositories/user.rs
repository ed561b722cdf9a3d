//! User repository implementation.

use sqlx::PgConnection;

use cinema_core::error::{AppError, ErrorKind};
use cinema_core::result::AppResult;
use cinema_core::types::UserId;
use cinema_entity::user::User;

/// Read-only access to users. User management lives outside this system.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRepository;

impl UserRepository {
    /// Find a user by ID inside an open transaction.
    pub async fn find_by_id_in(conn: &mut PgConnection, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }
}
