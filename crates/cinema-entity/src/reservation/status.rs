//! Reservation status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a reservation.
///
/// `PENDING -> CONFIRMED`, `PENDING -> CANCELLED` and
/// `CONFIRMED -> CANCELLED` are the only transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    /// Created, awaiting confirmation.
    Pending,
    /// Confirmed by an administrator.
    Confirmed,
    /// Cancelled by the owner or an administrator.
    Cancelled,
    /// Lapsed without confirmation.
    Expired,
}

impl ReservationStatus {
    /// Check whether moving to `next` is an allowed transition.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use ReservationStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Confirmed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Expired.can_transition_to(Cancelled));
    }
}
