//! # cinema-service
//!
//! Business logic for the cinema reservation platform. The reservation
//! lifecycle and the screening service orchestrate three components that
//! all run inside one storage transaction:
//!
//! - [`CapacityTracker`]: the per-screening available-seat counter
//! - [`OccupancyLedger`]: which seats of a screening are taken
//! - [`ScreeningScheduler`]: time-window validation and hall conflicts
//!
//! Storage is abstracted behind [`BookingStore`] with a PostgreSQL and an
//! in-memory implementation.

pub mod capacity;
pub mod context;
pub mod occupancy;
pub mod reservation;
pub mod screening;
pub mod store;

pub use capacity::{CapacityReport, CapacityTracker};
pub use context::RequestContext;
pub use occupancy::OccupancyLedger;
pub use reservation::{CreateReservation, ReservationService};
pub use screening::{CreateScreening, ScreeningScheduler, ScreeningService, UpdateScreening};
pub use store::{BookingStore, BookingTx, MemoryBookingStore, PgBookingStore};
