//! Reservation domain entities.

pub mod code;
pub mod model;
pub mod seat;
pub mod statistics;
pub mod status;

pub use code::generate_confirmation_code;
pub use model::{NewReservation, Reservation, ReservationDetails};
pub use seat::ReservedSeat;
pub use statistics::ReservationStatistics;
pub use status::ReservationStatus;
