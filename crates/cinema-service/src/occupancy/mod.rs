//! Seat occupancy tracking.

pub mod ledger;

pub use ledger::OccupancyLedger;
