//! Screening handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use cinema_core::error::AppError;
use cinema_core::types::ScreeningId;
use cinema_entity::screening::{Screening, ScreeningAvailability};
use cinema_service::{BookingStore, CapacityReport};

use crate::dto::request::{
    AvailableSeatsQuery, CreateScreeningRequest, ScreeningListQuery, UpdateScreeningRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::Caller;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn screening_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::invalid_screening_data(e.body_text()))
}

/// GET /api/screenings
pub async fn list_screenings<S: BookingStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ScreeningListQuery>,
) -> ApiResult<Vec<Screening>> {
    let list = state.screenings.find_all(query.movie_id).await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// GET /api/screenings/upcoming
pub async fn list_upcoming<S: BookingStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<Vec<Screening>> {
    let list = state.screenings.find_upcoming().await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// GET /api/screenings/available
pub async fn list_available<S: BookingStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<AvailableSeatsQuery>,
) -> ApiResult<Vec<Screening>> {
    let list = state
        .screenings
        .find_with_available_seats(query.min_seats)
        .await?;
    Ok(Json(ApiResponse::ok(list)))
}

/// GET /api/screenings/{id}
pub async fn get_screening<S: BookingStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<ScreeningId>,
) -> ApiResult<Screening> {
    let screening = state.screenings.find_by_id(id).await?;
    Ok(Json(ApiResponse::ok(screening)))
}

/// GET /api/screenings/{id}/availability
pub async fn get_availability<S: BookingStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<ScreeningId>,
) -> ApiResult<ScreeningAvailability> {
    let availability = state.screenings.availability(id).await?;
    Ok(Json(ApiResponse::ok(availability)))
}

/// POST /api/screenings
pub async fn create_screening<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    payload: Result<Json<CreateScreeningRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Screening>>), ApiError> {
    require_admin(&caller)?;
    let req = screening_body(payload)?;

    let screening = state.screenings.create_screening(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(screening))))
}

/// PUT /api/screenings/{id}
pub async fn update_screening<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ScreeningId>,
    payload: Result<Json<UpdateScreeningRequest>, JsonRejection>,
) -> ApiResult<Screening> {
    require_admin(&caller)?;
    let req = screening_body(payload)?;

    let screening = state.screenings.update_screening(id, req.into()).await?;
    Ok(Json(ApiResponse::ok(screening)))
}

/// DELETE /api/screenings/{id}
pub async fn delete_screening<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ScreeningId>,
) -> Result<StatusCode, ApiError> {
    require_admin(&caller)?;
    state.screenings.delete_screening(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/screenings/{id}/reconcile
pub async fn reconcile_capacity<S: BookingStore>(
    State(state): State<AppState<S>>,
    caller: Caller,
    Path(id): Path<ScreeningId>,
) -> ApiResult<CapacityReport> {
    require_admin(&caller)?;
    let report = state.screenings.reconcile_capacity(id).await?;
    Ok(Json(ApiResponse::ok(report)))
}
