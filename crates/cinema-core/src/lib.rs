//! # cinema-core
//!
//! Core crate for the cinema reservation platform. Contains configuration
//! schemas, typed identifiers, the seat position value type, the clock
//! abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
