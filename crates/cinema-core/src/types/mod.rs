//! Core type definitions used across the cinema workspace.

pub mod id;
pub mod seat;

pub use id::*;
pub use seat::SeatPosition;
