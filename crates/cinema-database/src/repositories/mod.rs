//! Repository implementations for the cinema entities.

pub mod hall;
pub mod movie;
pub mod reservation;
pub mod reserved_seat;
pub mod screening;
pub mod user;

pub use hall::HallRepository;
pub use movie::MovieRepository;
pub use reservation::ReservationRepository;
pub use reserved_seat::{ACTIVE_SEAT_CONSTRAINT, ReservedSeatRepository};
pub use screening::ScreeningRepository;
pub use user::UserRepository;
