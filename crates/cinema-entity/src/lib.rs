//! # cinema-entity
//!
//! Domain entity models for the cinema reservation platform. Every struct in
//! this crate represents a database table row or a domain value object.
//! Entities reference each other by typed id only; related rows are loaded
//! by explicit query. Database entities derive `sqlx::FromRow`.

pub mod hall;
pub mod movie;
pub mod reservation;
pub mod screening;
pub mod user;
