//! Reservation handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use cinema_core::error::AppError;
use cinema_core::types::{ReservationId, UserId};
use cinema_entity::reservation::{ReservationDetails, ReservationStatistics};
use cinema_service::BookingStore;

use crate::dto::request::CreateReservationRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::middleware::rbac::{require_admin, require_self_or_admin};
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// POST /api/reservations
pub async fn create_reservation<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    payload: Result<Json<CreateReservationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationDetails>>), ApiError> {
    let Json(req) =
        payload.map_err(|e| AppError::invalid_reservation_data(e.body_text()))?;
    let command = req.into_command()?;
    require_self_or_admin(&caller, command.user_id)?;

    let details = state.reservations.create_reservation(command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(details))))
}

/// GET /api/reservations/{id}
pub async fn get_reservation<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ReservationId>,
) -> ApiResult<ReservationDetails> {
    let details = state.reservations.find_by_id(id).await?;
    require_self_or_admin(&caller, details.reservation.user_id)?;
    Ok(Json(ApiResponse::ok(details)))
}

/// GET /api/reservations/confirmation/{code}
pub async fn get_by_confirmation_code<S: BookingStore>(
    State(state): State<AppState<S>>,
    _caller: Caller,
    Path(code): Path<String>,
) -> ApiResult<ReservationDetails> {
    let details = state.reservations.find_by_confirmation_code(&code).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// GET /api/reservations/user/{user_id}
pub async fn list_user_reservations<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(user_id): Path<UserId>,
) -> ApiResult<Vec<ReservationDetails>> {
    require_self_or_admin(&caller, user_id)?;
    let list = state.reservations.find_by_user(user_id).await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// PUT /api/reservations/{id}/confirm
pub async fn confirm_reservation<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ReservationId>,
) -> ApiResult<ReservationDetails> {
    require_admin(&caller)?;
    let details = state.reservations.confirm_reservation(id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// PUT /api/reservations/{id}/cancel
pub async fn cancel_reservation<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ReservationId>,
) -> ApiResult<ReservationDetails> {
    let existing = state.reservations.find_by_id(id).await?;
    require_self_or_admin(&caller, existing.reservation.user_id)?;

    let details = state.reservations.cancel_reservation(id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// GET /api/reservations/statistics
pub async fn statistics<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
) -> ApiResult<ReservationStatistics> {
    require_admin(&caller)?;
    let stats = state.reservations.statistics().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
