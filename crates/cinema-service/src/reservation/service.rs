//! Reservation creation, confirmation, cancellation, and queries.
//!
//! State machine: `PENDING -> CONFIRMED`, `PENDING -> CANCELLED`,
//! `CONFIRMED -> CANCELLED`. Each mutating operation is one transaction;
//! the screening row is locked before its counter is read and the
//! reservation row is locked before a transition.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cinema_core::config::BookingConfig;
use cinema_core::error::AppError;
use cinema_core::result::AppResult;
use cinema_core::traits::Clock;
use cinema_core::types::{ReservationId, ScreeningId, SeatPosition, UserId};
use cinema_entity::reservation::{
    NewReservation, Reservation, ReservationDetails, ReservationStatistics, ReservationStatus,
    ReservedSeat, generate_confirmation_code,
};

use crate::capacity::CapacityTracker;
use crate::occupancy::OccupancyLedger;
use crate::store::{BookingStore, BookingTx};

/// A request to book seats for a screening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    /// Booking user.
    pub user_id: UserId,
    /// Screening to book.
    pub screening_id: ScreeningId,
    /// Seats to book.
    pub seats: Vec<SeatPosition>,
}

/// Orchestrates the capacity tracker and occupancy ledger for reservations.
#[derive(Debug)]
pub struct ReservationService<S: BookingStore> {
    store: Arc<S>,
    capacity: CapacityTracker,
    ledger: OccupancyLedger,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl<S: BookingStore> ReservationService<S> {
    /// Creates a new reservation service.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: BookingConfig) -> Self {
        Self {
            store,
            capacity: CapacityTracker::new(),
            ledger: OccupancyLedger::new(),
            clock,
            config,
        }
    }

    /// Book seats. The reservation starts PENDING with a fresh
    /// confirmation code; nothing is written when any check fails.
    pub async fn create_reservation(
        &self,
        request: CreateReservation,
    ) -> AppResult<ReservationDetails> {
        self.validate_request(&request)?;
        let seat_count = i32::try_from(request.seats.len())
            .map_err(|_| AppError::invalid_reservation_data("Too many seats requested"))?;

        let mut tx = self.store.begin().await?;

        tx.find_user(request.user_id).await?.ok_or_else(|| {
            AppError::user_not_found(format!("User {} not found", request.user_id))
        })?;
        let screening = tx.lock_screening(request.screening_id).await?.ok_or_else(|| {
            AppError::screening_not_found(format!("Screening {} not found", request.screening_id))
        })?;
        let hall = tx.find_hall(screening.hall_id).await?.ok_or_else(|| {
            AppError::internal(format!(
                "Hall {} of screening {} not found",
                screening.hall_id, screening.id
            ))
        })?;
        if let Some(seat) = request.seats.iter().find(|seat| !hall.contains(seat)) {
            return Err(AppError::invalid_reservation_data(format!(
                "Seat {seat} does not exist in hall '{}' ({} rows x {} seats)",
                hall.name, hall.rows, hall.seats_per_row
            )));
        }

        if let Some(seat) = self
            .ledger
            .first_occupied(&mut tx, screening.id, &request.seats)
            .await?
        {
            return Err(AppError::seat_not_available(format!(
                "Seat {seat} is already reserved"
            )));
        }
        if !self
            .capacity
            .has_available_seats(&mut tx, screening.id, seat_count)
            .await?
        {
            return Err(AppError::seat_not_available(format!(
                "Only {} seats left for screening {}",
                screening.available_seats, screening.id
            )));
        }

        let total_price = screening.price * Decimal::from(seat_count);
        let reservation = tx
            .insert_reservation(&NewReservation {
                user_id: request.user_id,
                screening_id: screening.id,
                total_price,
                confirmation_code: generate_confirmation_code(),
                created_at: self.clock.now(),
            })
            .await?;
        let seats = self
            .ledger
            .record_seats(&mut tx, &reservation, &request.seats)
            .await?;
        if !self
            .capacity
            .reserve_seats(&mut tx, screening.id, seat_count)
            .await?
        {
            return Err(AppError::seat_not_available(format!(
                "Not enough seats left for screening {}",
                screening.id
            )));
        }
        tx.commit().await?;

        info!(
            reservation_id = %reservation.id,
            user_id = %reservation.user_id,
            screening_id = %reservation.screening_id,
            seats = seat_count,
            total_price = %reservation.total_price,
            confirmation_code = %reservation.confirmation_code,
            "Reservation created"
        );
        Ok(ReservationDetails { reservation, seats })
    }

    /// Move a PENDING reservation to CONFIRMED.
    pub async fn confirm_reservation(&self, id: ReservationId) -> AppResult<ReservationDetails> {
        let mut tx = self.store.begin().await?;
        let reservation = Self::lock_reservation(&mut tx, id).await?;

        if !reservation
            .status
            .can_transition_to(ReservationStatus::Confirmed)
        {
            warn!(
                reservation_id = %id,
                status = %reservation.status,
                "Rejected confirmation"
            );
            return Err(AppError::invalid_reservation_state(format!(
                "Reservation {id} is {} and cannot be confirmed",
                reservation.status
            )));
        }

        let reservation = tx
            .update_reservation_status(id, ReservationStatus::Confirmed, self.clock.now())
            .await?;
        let seats = tx.find_reserved_seats(id).await?;
        tx.commit().await?;

        info!(reservation_id = %id, "Reservation confirmed");
        Ok(ReservationDetails { reservation, seats })
    }

    /// Cancel a PENDING or CONFIRMED reservation, releasing its seats.
    ///
    /// Refused once the screening starts within the configured cutoff.
    pub async fn cancel_reservation(&self, id: ReservationId) -> AppResult<ReservationDetails> {
        let mut tx = self.store.begin().await?;
        let reservation = Self::lock_reservation(&mut tx, id).await?;

        if !reservation
            .status
            .can_transition_to(ReservationStatus::Cancelled)
        {
            warn!(
                reservation_id = %id,
                status = %reservation.status,
                "Rejected cancellation"
            );
            let message = match reservation.status {
                ReservationStatus::Cancelled => format!("Reservation {id} is already cancelled"),
                status => format!("Reservation {id} is {status} and cannot be cancelled"),
            };
            return Err(AppError::invalid_reservation_state(message));
        }

        let screening = tx
            .lock_screening(reservation.screening_id)
            .await?
            .ok_or_else(|| {
                AppError::screening_not_found(format!(
                    "Screening {} not found",
                    reservation.screening_id
                ))
            })?;
        let now = self.clock.now();
        let cutoff = self.config.cancellation_cutoff();
        if now >= screening.start_time - cutoff {
            return Err(AppError::reservation_cancellation(format!(
                "Reservations can only be cancelled more than {} minutes before the screening",
                cutoff.num_minutes()
            )));
        }

        let reservation = tx
            .update_reservation_status(id, ReservationStatus::Cancelled, now)
            .await?;
        let released = self.ledger.release_seats(&mut tx, id).await?;
        let released = i32::try_from(released)
            .map_err(|_| AppError::internal("Released seat count overflows"))?;
        if released > 0 {
            self.capacity
                .reserve_seats(&mut tx, screening.id, -released)
                .await?;
        }
        let seats = tx.find_reserved_seats(id).await?;
        tx.commit().await?;

        info!(
            reservation_id = %id,
            screening_id = %screening.id,
            released,
            "Reservation cancelled"
        );
        Ok(ReservationDetails { reservation, seats })
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: ReservationId) -> AppResult<ReservationDetails> {
        let reservation = self
            .store
            .find_reservation(id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(format!("Reservation {id} not found")))?;
        self.single_with_seats(reservation).await
    }

    /// Find a reservation by confirmation code.
    pub async fn find_by_confirmation_code(&self, code: &str) -> AppResult<ReservationDetails> {
        let reservation = self
            .store
            .find_reservation_by_code(code)
            .await?
            .ok_or_else(|| {
                AppError::reservation_not_found(format!(
                    "No reservation with confirmation code {code}"
                ))
            })?;
        self.single_with_seats(reservation).await
    }

    /// A user's reservations, newest first.
    pub async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<ReservationDetails>> {
        let reservations = self.store.list_reservations_by_user(user_id).await?;
        self.with_seats(reservations).await
    }

    /// All reservations of a screening, oldest first.
    pub async fn find_by_screening(
        &self,
        screening_id: ScreeningId,
    ) -> AppResult<Vec<ReservationDetails>> {
        let reservations = self
            .store
            .list_reservations_by_screening(screening_id)
            .await?;
        self.with_seats(reservations).await
    }

    /// Confirmed reservations created today, confirmed revenue over the
    /// last 30 days, and reservations created in the last 7 days.
    pub async fn statistics(&self) -> AppResult<ReservationStatistics> {
        let now = self.clock.now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc())
            .unwrap_or(now);
        self.store
            .reservation_statistics(
                today_start,
                now - Duration::days(30),
                now - Duration::days(7),
            )
            .await
    }

    fn validate_request(&self, request: &CreateReservation) -> AppResult<()> {
        if request.seats.is_empty() {
            return Err(AppError::invalid_reservation_data(
                "At least one seat must be selected",
            ));
        }
        let max = self.config.max_seats_per_reservation;
        if request.seats.len() > max {
            return Err(AppError::invalid_reservation_data(format!(
                "Cannot reserve more than {max} seats at once"
            )));
        }
        if let Some(seat) = request.seats.iter().find(|s| !s.is_well_formed()) {
            return Err(AppError::invalid_reservation_data(format!(
                "Invalid seat {seat}: row and seat numbers start at 1"
            )));
        }
        let mut seen = HashSet::with_capacity(request.seats.len());
        if let Some(seat) = request.seats.iter().find(|s| !seen.insert(**s)) {
            return Err(AppError::invalid_reservation_data(format!(
                "Seat {seat} is selected more than once"
            )));
        }
        Ok(())
    }

    async fn lock_reservation(tx: &mut S::Tx, id: ReservationId) -> AppResult<Reservation> {
        tx.lock_reservation(id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(format!("Reservation {id} not found")))
    }

    async fn single_with_seats(&self, reservation: Reservation) -> AppResult<ReservationDetails> {
        let seats = self.store.reserved_seats_of(&[reservation.id]).await?;
        Ok(ReservationDetails { reservation, seats })
    }

    async fn with_seats(
        &self,
        reservations: Vec<Reservation>,
    ) -> AppResult<Vec<ReservationDetails>> {
        let ids: Vec<ReservationId> = reservations.iter().map(|r| r.id).collect();
        let mut by_reservation: BTreeMap<ReservationId, Vec<ReservedSeat>> = BTreeMap::new();
        for seat in self.store.reserved_seats_of(&ids).await? {
            by_reservation
                .entry(seat.reservation_id)
                .or_default()
                .push(seat);
        }
        Ok(reservations
            .into_iter()
            .map(|reservation| {
                let seats = by_reservation.remove(&reservation.id).unwrap_or_default();
                ReservationDetails { reservation, seats }
            })
            .collect())
    }
}
