//! Screening administration and availability queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use cinema_core::error::AppError;
use cinema_core::result::AppResult;
use cinema_core::traits::Clock;
use cinema_core::types::{HallId, MovieId, ScreeningId};
use cinema_entity::screening::{
    NewScreening, Screening, ScreeningAvailability, ScreeningChanges,
};

use crate::capacity::{CapacityReport, CapacityTracker};
use crate::occupancy::OccupancyLedger;
use crate::store::{BookingStore, BookingTx};

use super::scheduler::ScreeningScheduler;

/// Data for scheduling a new screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScreening {
    /// Movie to show.
    pub movie_id: MovieId,
    /// Hall to show it in.
    pub hall_id: HallId,
    /// Start of the showing.
    pub start_time: DateTime<Utc>,
    /// End of the showing.
    pub end_time: DateTime<Utc>,
    /// Price per seat.
    pub price: Decimal,
}

/// Data for moving or repricing a screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScreening {
    /// New start.
    pub start_time: DateTime<Utc>,
    /// New end.
    pub end_time: DateTime<Utc>,
    /// New price per seat.
    pub price: Decimal,
    /// Move to another hall.
    #[serde(default)]
    pub hall_id: Option<HallId>,
}

/// Creates, moves, and deletes screenings; answers availability queries.
#[derive(Debug)]
pub struct ScreeningService<S: BookingStore> {
    store: Arc<S>,
    scheduler: ScreeningScheduler,
    capacity: CapacityTracker,
    ledger: OccupancyLedger,
    clock: Arc<dyn Clock>,
}

impl<S: BookingStore> ScreeningService<S> {
    /// Creates a new screening service.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            scheduler: ScreeningScheduler::new(Arc::clone(&clock)),
            capacity: CapacityTracker::new(),
            ledger: OccupancyLedger::new(),
            clock,
        }
    }

    /// The scheduler used for validation and conflict checks.
    pub fn scheduler(&self) -> &ScreeningScheduler {
        &self.scheduler
    }

    /// Schedule a screening. Capacity and the seat counter start at the
    /// hall's total seats.
    pub async fn create_screening(&self, request: CreateScreening) -> AppResult<Screening> {
        self.scheduler
            .validate(request.start_time, request.end_time, request.price)?;

        let mut tx = self.store.begin().await?;
        tx.find_movie(request.movie_id).await?.ok_or_else(|| {
            AppError::invalid_screening_data(format!("Movie {} not found", request.movie_id))
        })?;
        let hall = tx.lock_hall(request.hall_id).await?.ok_or_else(|| {
            AppError::invalid_screening_data(format!("Hall {} not found", request.hall_id))
        })?;

        self.scheduler
            .check_conflicts(
                &mut tx,
                hall.id,
                request.start_time,
                request.end_time,
                None,
            )
            .await?;

        let screening = tx
            .insert_screening(&NewScreening {
                movie_id: request.movie_id,
                hall_id: hall.id,
                start_time: request.start_time,
                end_time: request.end_time,
                price: request.price,
                capacity: hall.total_seats,
                created_at: self.clock.now(),
            })
            .await?;
        tx.commit().await?;

        info!(
            screening_id = %screening.id,
            movie_id = %screening.movie_id,
            hall_id = %screening.hall_id,
            start = %screening.start_time,
            capacity = screening.capacity,
            "Screening created"
        );
        Ok(screening)
    }

    /// Move, reprice, or re-hall a screening.
    ///
    /// The past-start rule applies only when the start moves; conflicts are
    /// checked only when the start or the hall changes.
    pub async fn update_screening(
        &self,
        id: ScreeningId,
        request: UpdateScreening,
    ) -> AppResult<Screening> {
        let mut tx = self.store.begin().await?;
        let current = tx
            .lock_screening(id)
            .await?
            .ok_or_else(|| AppError::screening_not_found(format!("Screening {id} not found")))?;

        let start_changed = current.start_time != request.start_time;
        if start_changed {
            self.scheduler
                .validate(request.start_time, request.end_time, request.price)?;
        } else {
            self.scheduler
                .validate_window(request.start_time, request.end_time, request.price)?;
        }

        let hall_id = request.hall_id.unwrap_or(current.hall_id);
        let hall_changed = hall_id != current.hall_id;

        // Conflict checks run under the target hall lock.
        // A hall move locks both halls in id order.
        let target_hall = if hall_changed {
            let (first, second) = if current.hall_id < hall_id {
                (current.hall_id, hall_id)
            } else {
                (hall_id, current.hall_id)
            };
            let first_hall = tx.lock_hall(first).await?;
            let second_hall = tx.lock_hall(second).await?;
            if first == hall_id { first_hall } else { second_hall }
        } else if start_changed {
            tx.lock_hall(hall_id).await?
        } else {
            None
        };

        let (capacity, available_seats) = if hall_changed {
            let hall = target_hall.ok_or_else(|| {
                AppError::invalid_screening_data(format!("Hall {hall_id} not found"))
            })?;
            let occupied = tx.active_seats(id).await?;
            if let Some(seat) = occupied.iter().find(|seat| !hall.contains(seat)) {
                return Err(AppError::invalid_screening_data(format!(
                    "Hall {hall_id} has no seat {seat} which is already reserved"
                )));
            }
            let occupied_count = i32::try_from(occupied.len())
                .map_err(|_| AppError::internal("Active seat count overflows"))?;
            if occupied_count > hall.total_seats {
                return Err(AppError::invalid_screening_data(format!(
                    "Hall {hall_id} has {} seats but {occupied_count} are already reserved",
                    hall.total_seats
                )));
            }
            (hall.total_seats, hall.total_seats - occupied_count)
        } else {
            (current.capacity, current.available_seats)
        };

        if start_changed || hall_changed {
            self.scheduler
                .check_conflicts(
                    &mut tx,
                    hall_id,
                    request.start_time,
                    request.end_time,
                    Some(id),
                )
                .await?;
        }

        let screening = tx
            .update_screening(
                id,
                &ScreeningChanges {
                    hall_id,
                    start_time: request.start_time,
                    end_time: request.end_time,
                    price: request.price,
                    capacity,
                    available_seats,
                    updated_at: self.clock.now(),
                },
            )
            .await?;
        tx.commit().await?;

        info!(
            screening_id = %id,
            hall_id = %hall_id,
            start = %screening.start_time,
            hall_changed,
            "Screening updated"
        );
        Ok(screening)
    }

    /// Delete a screening with its reservations and seats.
    pub async fn delete_screening(&self, id: ScreeningId) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        tx.lock_screening(id)
            .await?
            .ok_or_else(|| AppError::screening_not_found(format!("Screening {id} not found")))?;
        tx.delete_screening(id).await?;
        tx.commit().await?;

        info!(screening_id = %id, "Screening deleted");
        Ok(())
    }

    /// Find a screening by ID.
    pub async fn find_by_id(&self, id: ScreeningId) -> AppResult<Screening> {
        self.store
            .find_screening(id)
            .await?
            .ok_or_else(|| AppError::screening_not_found(format!("Screening {id} not found")))
    }

    /// All screenings, or those of one movie.
    pub async fn find_all(&self, movie_id: Option<MovieId>) -> AppResult<Vec<Screening>> {
        match movie_id {
            Some(movie_id) => self.store.list_screenings_by_movie(movie_id).await,
            None => self.store.list_screenings().await,
        }
    }

    /// Screenings that have not started yet and still have seats.
    pub async fn find_upcoming(&self) -> AppResult<Vec<Screening>> {
        self.store
            .list_upcoming_screenings(self.clock.now())
            .await
    }

    /// Screenings not yet started with at least `min_seats` seats left.
    pub async fn find_with_available_seats(&self, min_seats: i32) -> AppResult<Vec<Screening>> {
        self.store
            .list_screenings_with_available_seats(min_seats.max(1), self.clock.now())
            .await
    }

    /// Capacity, remaining seats, and the taken seats of a screening.
    pub async fn availability(&self, id: ScreeningId) -> AppResult<ScreeningAvailability> {
        let screening = self.find_by_id(id).await?;
        let occupied_seats = self.ledger.occupied_seats(self.store.as_ref(), id).await?;
        Ok(ScreeningAvailability {
            screening_id: id,
            capacity: screening.capacity,
            available_seats: screening.available_seats,
            occupied_seats,
        })
    }

    /// Recompute a screening's counter from its active seats.
    pub async fn reconcile_capacity(&self, id: ScreeningId) -> AppResult<CapacityReport> {
        let mut tx = self.store.begin().await?;
        let report = self.capacity.reconcile(&mut tx, id).await?;
        tx.commit().await?;
        Ok(report)
    }
}
