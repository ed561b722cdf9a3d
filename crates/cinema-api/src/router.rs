//! Route definitions for the cinema HTTP API.
//!
//! All routes are mounted under `/api`. The router is generic over the
//! booking store so that handlers are instantiated per backend.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use cinema_service::BookingStore;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router<S: BookingStore>(state: AppState<S>) -> Router {
    let server = &state.config.server;
    let cors = build_cors_layer(&server.cors);
    let timeout = Duration::from_secs(server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(reservation_routes::<S>())
        .merge(screening_routes::<S>())
        .merge(health_routes::<S>());

    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Reservation lifecycle endpoints
fn reservation_routes<S: BookingStore>() -> Router<AppState<S>> {
    use handlers::reservation;

    Router::new()
        .route("/reservations", post(reservation::create_reservation::<S>))
        .route("/reservations/statistics", get(reservation::statistics::<S>))
        .route("/reservations/{id}", get(reservation::get_reservation::<S>))
        .route(
            "/reservations/confirmation/{code}",
            get(reservation::get_by_confirmation_code::<S>),
        )
        .route(
            "/reservations/user/{user_id}",
            get(reservation::list_user_reservations::<S>),
        )
        .route(
            "/reservations/{id}/confirm",
            put(reservation::confirm_reservation::<S>),
        )
        .route(
            "/reservations/{id}/cancel",
            put(reservation::cancel_reservation::<S>),
        )
}

/// Screening queries and administration
fn screening_routes<S: BookingStore>() -> Router<AppState<S>> {
    use handlers::screening;

    Router::new()
        .route(
            "/screenings",
            get(screening::list_screenings::<S>).post(screening::create_screening::<S>),
        )
        .route("/screenings/upcoming", get(screening::list_upcoming::<S>))
        .route("/screenings/available", get(screening::list_available::<S>))
        .route(
            "/screenings/{id}",
            get(screening::get_screening::<S>)
                .put(screening::update_screening::<S>)
                .delete(screening::delete_screening::<S>),
        )
        .route(
            "/screenings/{id}/availability",
            get(screening::get_availability::<S>),
        )
        .route(
            "/screenings/{id}/reconcile",
            post(screening::reconcile_capacity::<S>),
        )
}

/// Health check endpoint (no caller identity required)
fn health_routes<S: BookingStore>() -> Router<AppState<S>> {
    Router::new().route("/health", get(handlers::health::health::<S>))
}
