//! Cinema hall entities.

pub mod hall_type;
pub mod model;

pub use hall_type::HallType;
pub use model::CinemaHall;
