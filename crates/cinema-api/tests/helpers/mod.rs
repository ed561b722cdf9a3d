//! Shared helpers for API tests: an in-memory app driven with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use cinema_api::{AppState, build_router};
use cinema_core::config::{AppConfig, BookingConfig, DatabaseConfig};
use cinema_core::traits::{Clock, FixedClock};
use cinema_entity::hall::{CinemaHall, HallType};
use cinema_entity::movie::Movie;
use cinema_entity::user::{User, UserRole};
use cinema_service::MemoryBookingStore;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for seeding
    pub store: Arc<MemoryBookingStore>,
    /// Frozen clock
    pub clock: Arc<FixedClock>,
    pub user: User,
    pub other_user: User,
    pub admin: User,
    pub movie: Movie,
    pub hall: CinemaHall,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when empty)
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// 2030-06-01 09:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn test_config() -> AppConfig {
    AppConfig {
        server: Default::default(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
            run_migrations: false,
        },
        booking: BookingConfig::default(),
        logging: Default::default(),
    }
}

impl TestApp {
    /// Create a new test application with a 10 x 20 hall
    pub async fn new() -> Self {
        let store = Arc::new(MemoryBookingStore::new());
        let clock = Arc::new(FixedClock::new(base_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let user = store.add_user("alice", UserRole::User).await;
        let other_user = store.add_user("carol", UserRole::User).await;
        let admin = store.add_user("root", UserRole::Admin).await;
        let movie = store.add_movie("Arrival", 116).await;
        let hall = store.add_hall("Hall 1", 10, 20, HallType::Standard).await;

        let state = AppState::new(test_config(), Arc::clone(&store), dyn_clock);
        let router = build_router(state);

        Self {
            router,
            store,
            clock,
            user,
            other_user,
            admin,
            movie,
            hall,
        }
    }

    /// Send a request as `caller` (`None` for no identity headers)
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        caller: Option<&User>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = caller {
            req = req
                .header("x-user-id", user.id.to_string())
                .header("x-user-role", user.role.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Schedule a two-hour screening `offset` from now through the API
    pub async fn create_screening(&self, offset: Duration) -> i64 {
        let start = base_time() + offset;
        let response = self
            .request(
                "POST",
                "/api/screenings",
                Some(serde_json::json!({
                    "movieId": self.movie.id,
                    "hallId": self.hall.id,
                    "startTime": start,
                    "endTime": start + Duration::hours(2),
                    "price": "12.00",
                })),
                Some(&self.admin),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"].as_i64().expect("screening id")
    }

    /// Book seats for `user` and return the reservation JSON
    pub async fn reserve(&self, user: &User, screening_id: i64, seats: &[(i32, i32)]) -> TestResponse {
        let seats: Vec<Value> = seats
            .iter()
            .map(|&(r, s)| serde_json::json!({ "rowNumber": r, "seatNumber": s }))
            .collect();
        self.request(
            "POST",
            "/api/reservations",
            Some(serde_json::json!({
                "userId": user.id,
                "screeningId": screening_id,
                "seats": seats,
            })),
            Some(user),
        )
        .await
    }
}
