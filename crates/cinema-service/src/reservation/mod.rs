//! Reservation lifecycle.

pub mod service;

pub use service::{CreateReservation, ReservationService};
