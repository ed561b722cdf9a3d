//! Hall type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Projection and seating format of a hall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "hall_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HallType {
    /// Regular hall.
    Standard,
    /// IMAX screen.
    Imax,
    /// Premium seating.
    Vip,
    /// Dolby Atmos sound.
    DolbyAtmos,
}

impl HallType {
    /// Return the type as a database-style string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "STANDARD",
            Self::Imax => "IMAX",
            Self::Vip => "VIP",
            Self::DolbyAtmos => "DOLBY_ATMOS",
        }
    }
}

impl fmt::Display for HallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
