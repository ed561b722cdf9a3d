//! Movie entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cinema_core::types::MovieId;

/// A film that can be scheduled into screenings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    /// Unique movie identifier.
    pub id: MovieId,
    /// Title.
    pub title: String,
    /// Running time in minutes.
    pub duration_minutes: i32,
}
