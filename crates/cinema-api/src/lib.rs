//! # cinema-api
//!
//! HTTP API layer for the cinema reservation platform built on Axum.
//!
//! Provides the REST endpoints for screenings and reservations, the caller
//! extractor, RBAC guards, CORS, DTOs, and error mapping. The router is
//! generic over the [`BookingStore`](cinema_service::BookingStore) so the
//! same routes run against PostgreSQL in production and the in-memory
//! store in tests.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
