//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use cinema_core::error::AppError;
use cinema_core::types::{HallId, MovieId, ScreeningId, SeatPosition, UserId};
use cinema_service::{CreateReservation, CreateScreening, UpdateScreening};

/// One seat in a reservation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    /// 1-based row.
    #[validate(range(min = 1, message = "Row number must be positive"))]
    pub row_number: i32,
    /// 1-based seat within the row.
    #[validate(range(min = 1, message = "Seat number must be positive"))]
    pub seat_number: i32,
}

/// Create reservation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Booking user.
    pub user_id: Option<UserId>,
    /// Screening to book.
    pub screening_id: Option<ScreeningId>,
    /// Requested seats.
    #[serde(default)]
    #[validate(
        length(min = 1, message = "At least one seat must be selected"),
        nested
    )]
    pub seats: Vec<SeatRequest>,
}

impl CreateReservationRequest {
    /// Validate and convert into the service command.
    pub fn into_command(self) -> Result<CreateReservation, AppError> {
        self.validate()
            .map_err(|e| AppError::invalid_reservation_data(describe(&e)))?;

        let user_id = self
            .user_id
            .ok_or_else(|| AppError::invalid_reservation_data("User ID is required"))?;
        let screening_id = self
            .screening_id
            .ok_or_else(|| AppError::invalid_reservation_data("Screening ID is required"))?;

        Ok(CreateReservation {
            user_id,
            screening_id,
            seats: self
                .seats
                .iter()
                .map(|s| SeatPosition::new(s.row_number, s.seat_number))
                .collect(),
        })
    }
}

/// Create screening request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScreeningRequest {
    /// Movie to show.
    pub movie_id: MovieId,
    /// Hall to show it in.
    pub hall_id: HallId,
    /// Start of the showing.
    pub start_time: DateTime<Utc>,
    /// End of the showing.
    pub end_time: DateTime<Utc>,
    /// Price per seat.
    pub price: Decimal,
}

impl From<CreateScreeningRequest> for CreateScreening {
    fn from(req: CreateScreeningRequest) -> Self {
        Self {
            movie_id: req.movie_id,
            hall_id: req.hall_id,
            start_time: req.start_time,
            end_time: req.end_time,
            price: req.price,
        }
    }
}

/// Update screening request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScreeningRequest {
    /// New start.
    pub start_time: DateTime<Utc>,
    /// New end.
    pub end_time: DateTime<Utc>,
    /// New price per seat.
    pub price: Decimal,
    /// Move to another hall.
    #[serde(default)]
    pub hall_id: Option<HallId>,
}

impl From<UpdateScreeningRequest> for UpdateScreening {
    fn from(req: UpdateScreeningRequest) -> Self {
        Self {
            start_time: req.start_time,
            end_time: req.end_time,
            price: req.price,
            hall_id: req.hall_id,
        }
    }
}

/// `GET /api/screenings` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningListQuery {
    /// Only screenings of this movie.
    pub movie_id: Option<MovieId>,
}

/// `GET /api/screenings/available` query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSeatsQuery {
    /// Minimum number of free seats.
    #[serde(default = "default_min_seats")]
    pub min_seats: i32,
}

fn default_min_seats() -> i32 {
    1
}

/// Flatten validator errors into one readable message.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = Vec::new();
    collect_messages(errors, &mut messages);
    if messages.is_empty() {
        "Invalid reservation request".to_string()
    } else {
        messages.join("; ")
    }
}

fn collect_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {field}"),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(inner, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_messages(inner, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinema_core::error::ErrorKind;

    fn parse(json: serde_json::Value) -> CreateReservationRequest {
        serde_json::from_value(json).expect("valid json shape")
    }

    #[test]
    fn test_missing_ids_are_invalid_data() {
        let req = parse(serde_json::json!({
            "screeningId": 3,
            "seats": [{ "rowNumber": 1, "seatNumber": 1 }]
        }));
        let err = req.into_command().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReservationData);
        assert_eq!(err.message, "User ID is required");
    }

    #[test]
    fn test_empty_and_non_positive_seats_rejected() {
        let req = parse(serde_json::json!({ "userId": 1, "screeningId": 3, "seats": [] }));
        let err = req.into_command().unwrap_err();
        assert!(err.message.contains("At least one seat"));

        let req = parse(serde_json::json!({
            "userId": 1,
            "screeningId": 3,
            "seats": [{ "rowNumber": 0, "seatNumber": 4 }]
        }));
        let err = req.into_command().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidReservationData);
        assert!(err.message.contains("Row number must be positive"));
    }

    #[test]
    fn test_into_command() {
        let cmd = parse(serde_json::json!({
            "userId": 1,
            "screeningId": 3,
            "seats": [{ "rowNumber": 5, "seatNumber": 10 }]
        }))
        .into_command()
        .expect("valid request");
        assert_eq!(cmd.user_id, UserId::new(1));
        assert_eq!(cmd.seats, vec![SeatPosition::new(5, 10)]);
    }
}
