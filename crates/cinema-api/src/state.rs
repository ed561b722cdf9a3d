//! Application state shared across all handlers.

use std::sync::Arc;

use cinema_core::config::AppConfig;
use cinema_core::traits::Clock;
use cinema_service::{BookingStore, ReservationService, ScreeningService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState<S>>`.
#[derive(Debug)]
pub struct AppState<S: BookingStore> {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Booking storage backend
    pub store: Arc<S>,
    /// Reservation lifecycle service
    pub reservations: Arc<ReservationService<S>>,
    /// Screening administration service
    pub screenings: Arc<ScreeningService<S>>,
}

impl<S: BookingStore> AppState<S> {
    /// Wire the services on top of `store`.
    pub fn new(config: AppConfig, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let reservations = Arc::new(ReservationService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.booking.clone(),
        ));
        let screenings = Arc::new(ScreeningService::new(Arc::clone(&store), clock));

        Self {
            config: Arc::new(config),
            store,
            reservations,
            screenings,
        }
    }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S: BookingStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
            reservations: Arc::clone(&self.reservations),
            screenings: Arc::clone(&self.screenings),
        }
    }
}
