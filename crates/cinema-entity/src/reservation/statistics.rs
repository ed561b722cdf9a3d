//! Aggregate reservation figures for the admin dashboard.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reservation counters over fixed windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStatistics {
    /// Confirmed reservations created since midnight UTC.
    pub confirmed_today: i64,
    /// Sum of `total_price` of confirmed reservations created in the last 30 days.
    pub revenue_last_30_days: Decimal,
    /// Reservations of any status created in the last 7 days.
    pub created_last_7_days: i64,
}
