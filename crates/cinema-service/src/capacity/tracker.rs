//! Available-seat counter per screening.
//!
//! Every operation runs inside the caller's transaction and locks the
//! screening row before reading the counter.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use cinema_core::error::AppError;
use cinema_core::result::AppResult;
use cinema_core::types::ScreeningId;

use crate::store::BookingTx;

/// Outcome of comparing a screening's counter with its active seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    /// The reconciled screening.
    pub screening_id: ScreeningId,
    /// Total seats.
    pub capacity: i32,
    /// Number of active reserved seats.
    pub active_seats: i32,
    /// Counter value before reconciliation.
    pub recorded_available: i32,
    /// `capacity - active_seats`.
    pub expected_available: i32,
    /// Whether the counter was corrected.
    pub drift_detected: bool,
}

/// Owns the `available_seats` counter of screenings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapacityTracker;

impl CapacityTracker {
    /// Creates a tracker.
    pub fn new() -> Self {
        Self
    }

    /// True iff the screening exists, `seats >= 1`, and at least `seats`
    /// seats are left.
    pub async fn has_available_seats<T: BookingTx>(
        &self,
        tx: &mut T,
        screening_id: ScreeningId,
        seats: i32,
    ) -> AppResult<bool> {
        if seats < 1 {
            return Ok(false);
        }
        Ok(tx
            .lock_screening(screening_id)
            .await?
            .is_some_and(|s| s.available_seats >= seats))
    }

    /// Adjust the counter by `-delta`.
    ///
    /// A positive delta takes seats and returns `false` without writing
    /// when fewer than `delta` are left. A negative delta gives seats back;
    /// pushing the counter above capacity means seats were released twice
    /// and fails with an internal error.
    pub async fn reserve_seats<T: BookingTx>(
        &self,
        tx: &mut T,
        screening_id: ScreeningId,
        delta: i32,
    ) -> AppResult<bool> {
        let screening = tx.lock_screening(screening_id).await?.ok_or_else(|| {
            AppError::screening_not_found(format!("Screening {screening_id} not found"))
        })?;

        let updated = screening.available_seats - delta;
        if delta > 0 && updated < 0 {
            warn!(
                screening_id = %screening_id,
                requested = delta,
                available = screening.available_seats,
                "Not enough seats left"
            );
            return Ok(false);
        }
        if updated > screening.capacity {
            error!(
                screening_id = %screening_id,
                released = -delta,
                available = screening.available_seats,
                capacity = screening.capacity,
                "Seat release would exceed capacity"
            );
            return Err(AppError::internal(format!(
                "Releasing {} seats would exceed capacity of screening {screening_id}",
                -delta
            )));
        }

        tx.set_available_seats(screening_id, updated).await?;
        Ok(true)
    }

    /// Recompute the counter from the active seats and correct any drift.
    pub async fn reconcile<T: BookingTx>(
        &self,
        tx: &mut T,
        screening_id: ScreeningId,
    ) -> AppResult<CapacityReport> {
        let screening = tx.lock_screening(screening_id).await?.ok_or_else(|| {
            AppError::screening_not_found(format!("Screening {screening_id} not found"))
        })?;
        let active_seats = i32::try_from(tx.active_seats(screening_id).await?.len())
            .map_err(|_| AppError::internal("Active seat count overflows"))?;

        let expected_available = screening.capacity - active_seats;
        if expected_available < 0 {
            error!(
                screening_id = %screening_id,
                capacity = screening.capacity,
                active_seats,
                "Screening is overbooked"
            );
            return Err(AppError::internal(format!(
                "Screening {screening_id} holds {active_seats} seats but has capacity {}",
                screening.capacity
            )));
        }

        let drift_detected = screening.available_seats != expected_available;
        if drift_detected {
            warn!(
                screening_id = %screening_id,
                recorded = screening.available_seats,
                expected = expected_available,
                delta = screening.available_seats - expected_available,
                "Capacity drift detected, reconciling"
            );
            tx.set_available_seats(screening_id, expected_available)
                .await?;
        } else {
            info!(screening_id = %screening_id, "Capacity counter consistent");
        }

        Ok(CapacityReport {
            screening_id,
            capacity: screening.capacity,
            active_seats,
            recorded_available: screening.available_seats,
            expected_available,
            drift_detected,
        })
    }
}
