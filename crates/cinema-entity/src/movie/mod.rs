//! Movie entities.

pub mod model;

pub use model::Movie;
