//! Connection pool shared by the booking store and migrations.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use cinema_core::config::DatabaseConfig;
use cinema_core::error::{AppError, ErrorKind};

/// PostgreSQL pool backing the reservation tables.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by the `[database]` config section.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %redact_credentials(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Opening booking database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Booking database unreachable: {e}"),
                    e,
                )
            })?;

        info!("Booking database pool ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; backs the `/health` endpoint.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Booking database not responding", e)
            })
    }

    /// Drain the pool during shutdown. In-flight reservations finish first.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Booking database pool drained");
    }
}

/// Replace the password in a connection URL with `****`.
fn redact_credentials(url: &str) -> String {
    let Some(at) = url.rfind('@') else {
        return url.to_string();
    };
    let authority_start = url.find("://").map_or(0, |p| p + 3);
    match url[..at].rfind(':') {
        Some(colon) if colon > authority_start => {
            format!("{}:****@{}", &url[..colon], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
