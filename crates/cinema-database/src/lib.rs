//! # cinema-database
//!
//! PostgreSQL connection management and repository implementations for the
//! cinema entities.
//!
//! Repositories expose two kinds of operations: read queries that run on
//! the shared pool, and transactional operations that take a
//! `&mut PgConnection` so the caller can compose them inside one
//! `sqlx::Transaction`.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
