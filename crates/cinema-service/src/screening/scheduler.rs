//! Screening time-window validation and hall conflict detection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use cinema_core::error::AppError;
use cinema_core::result::AppResult;
use cinema_core::traits::Clock;
use cinema_core::types::{HallId, ScreeningId};
use cinema_entity::screening::Screening;

use crate::store::BookingTx;

/// Validates screening windows and detects overlapping screenings in a hall.
#[derive(Debug, Clone)]
pub struct ScreeningScheduler {
    clock: Arc<dyn Clock>,
}

impl ScreeningScheduler {
    /// Creates a scheduler reading the time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Fails `InvalidScreeningData` when the start is after the end, the
    /// start is in the past, or the price is not positive.
    pub fn validate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price: Decimal,
    ) -> AppResult<()> {
        self.validate_window(start, end, price)?;
        if start < self.clock.now() {
            return Err(AppError::invalid_screening_data(
                "Screening cannot start in the past",
            ));
        }
        Ok(())
    }

    /// Same as [`validate`](Self::validate) without the past-start rule.
    pub fn validate_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        price: Decimal,
    ) -> AppResult<()> {
        if start > end {
            return Err(AppError::invalid_screening_data(
                "Start time must be before end time",
            ));
        }
        if price <= Decimal::ZERO {
            return Err(AppError::invalid_screening_data("Price must be positive"));
        }
        Ok(())
    }

    /// Screenings in the hall overlapping `[start, end]`, boundaries
    /// inclusive, excluding `exclude`.
    pub async fn find_conflicts<T: BookingTx>(
        &self,
        tx: &mut T,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<Vec<Screening>> {
        tx.find_conflicting_screenings(hall_id, start, end, exclude)
            .await
    }

    /// Fails `ScreeningConflict` when [`find_conflicts`](Self::find_conflicts)
    /// returns anything.
    pub async fn check_conflicts<T: BookingTx>(
        &self,
        tx: &mut T,
        hall_id: HallId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<ScreeningId>,
    ) -> AppResult<()> {
        let conflicts = self.find_conflicts(tx, hall_id, start, end, exclude).await?;
        if conflicts.is_empty() {
            return Ok(());
        }

        let ids: Vec<String> = conflicts.iter().map(|s| s.id.to_string()).collect();
        warn!(
            hall_id = %hall_id,
            start = %start,
            end = %end,
            conflicting = %ids.join(","),
            "Screening conflicts with existing schedule"
        );
        Err(AppError::screening_conflict(format!(
            "Hall {hall_id} already has screening(s) {} between {start} and {end}",
            ids.join(", ")
        )))
    }
}
