//! Unified application error types.
//!
//! Every crate maps its failures into [`AppError`] so that domain errors
//! (seat taken, screening conflict, ...) and infrastructure errors travel
//! through the `?` operator with a single type.

use std::fmt;
use thiserror::Error;

/// Error kind categorization shared by the whole workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Malformed reservation request (missing ids, empty or oversized seat list).
    InvalidReservationData,
    /// The referenced user does not exist.
    UserNotFound,
    /// The referenced screening does not exist.
    ScreeningNotFound,
    /// The referenced reservation does not exist.
    ReservationNotFound,
    /// A requested seat is already held by an active reservation.
    SeatNotAvailable,
    /// A status transition was attempted from a state that disallows it.
    InvalidReservationState,
    /// Cancellation attempted inside the cutoff window before the screening.
    ReservationCancellation,
    /// Bad screening time window, non-positive price, or unknown movie/hall.
    InvalidScreeningData,
    /// An overlapping screening exists in the same hall.
    ScreeningConflict,
    /// The caller identity is missing or malformed.
    Unauthorized,
    /// The caller is not allowed to perform the action.
    Forbidden,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal invariant was violated.
    Internal,
}

impl ErrorKind {
    /// Whether this kind represents a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound | Self::ScreeningNotFound | Self::ReservationNotFound
        )
    }

    /// Machine-readable code used in API responses and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidReservationData => "INVALID_RESERVATION_DATA",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::ScreeningNotFound => "SCREENING_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::SeatNotAvailable => "SEAT_NOT_AVAILABLE",
            Self::InvalidReservationState => "INVALID_RESERVATION_STATE",
            Self::ReservationCancellation => "RESERVATION_CANCELLATION",
            Self::InvalidScreeningData => "INVALID_SCREENING_DATA",
            Self::ScreeningConflict => "SCREENING_CONFLICT",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Database => "DATABASE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error.
///
/// Crate-specific failures are mapped into `AppError` with `From` impls or
/// explicit `.map_err()` calls, giving one error type at every boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-reservation-data error.
    pub fn invalid_reservation_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidReservationData, message)
    }

    /// Create a user-not-found error.
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UserNotFound, message)
    }

    /// Create a screening-not-found error.
    pub fn screening_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ScreeningNotFound, message)
    }

    /// Create a reservation-not-found error.
    pub fn reservation_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReservationNotFound, message)
    }

    /// Create a seat-not-available error.
    pub fn seat_not_available(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SeatNotAvailable, message)
    }

    /// Create an invalid-reservation-state error.
    pub fn invalid_reservation_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidReservationState, message)
    }

    /// Create a cancellation-window error.
    pub fn reservation_cancellation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReservationCancellation, message)
    }

    /// Create an invalid-screening-data error.
    pub fn invalid_screening_data(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidScreeningData, message)
    }

    /// Create a screening-conflict error.
    pub fn screening_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ScreeningConflict, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
