//! HTTP tests for the screening endpoints and health check.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;

use helpers::{TestApp, base_time};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_create_screening_requires_admin() {
    let app = TestApp::new().await;
    let start = base_time() + Duration::days(1);

    let response = app
        .request(
            "POST",
            "/api/screenings",
            Some(serde_json::json!({
                "movieId": app.movie.id,
                "hallId": app.hall.id,
                "startTime": start,
                "endTime": start + Duration::hours(2),
                "price": "9.50",
            })),
            Some(&app.user),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_overlapping_screening_is_conflict() {
    let app = TestApp::new().await;
    // Existing 11:00-13:00.
    app.create_screening(Duration::hours(2)).await;
    let start = base_time() + Duration::hours(1);

    let response = app
        .request(
            "POST",
            "/api/screenings",
            Some(serde_json::json!({
                "movieId": app.movie.id,
                "hallId": app.hall.id,
                "startTime": start,
                "endTime": start + Duration::hours(2),
                "price": "9.50",
            })),
            Some(&app.admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "SCREENING_CONFLICT");
}

#[tokio::test]
async fn test_invalid_screening_payloads() {
    let app = TestApp::new().await;
    let start = base_time() + Duration::days(1);

    let inverted = app
        .request(
            "POST",
            "/api/screenings",
            Some(serde_json::json!({
                "movieId": app.movie.id,
                "hallId": app.hall.id,
                "startTime": start,
                "endTime": start - Duration::hours(1),
                "price": "9.50",
            })),
            Some(&app.admin),
        )
        .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);
    assert_eq!(inverted.error_code(), "INVALID_SCREENING_DATA");

    let missing_fields = app
        .request(
            "POST",
            "/api/screenings",
            Some(serde_json::json!({ "movieId": app.movie.id })),
            Some(&app.admin),
        )
        .await;
    assert_eq!(missing_fields.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_fields.error_code(), "INVALID_SCREENING_DATA");
}

#[tokio::test]
async fn test_screening_queries() {
    let app = TestApp::new().await;
    let first = app.create_screening(Duration::days(1)).await;
    let second = app.create_screening(Duration::days(2)).await;

    let all = app.request("GET", "/api/screenings", None, None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.data().as_array().map(Vec::len), Some(2));

    let by_movie = app
        .request(
            "GET",
            &format!("/api/screenings?movieId={}", app.movie.id),
            None,
            None,
        )
        .await;
    assert_eq!(by_movie.data().as_array().map(Vec::len), Some(2));

    let other_movie = app
        .request("GET", "/api/screenings?movieId=9999", None, None)
        .await;
    assert_eq!(other_movie.data().as_array().map(Vec::len), Some(0));

    let upcoming = app.request("GET", "/api/screenings/upcoming", None, None).await;
    assert_eq!(upcoming.data()[0]["id"], first);

    let roomy = app
        .request("GET", "/api/screenings/available?minSeats=200", None, None)
        .await;
    assert_eq!(roomy.data().as_array().map(Vec::len), Some(2));

    let one = app
        .request("GET", &format!("/api/screenings/{second}"), None, None)
        .await;
    assert_eq!(one.status, StatusCode::OK);
    assert_eq!(one.data()["capacity"], 200);

    let missing = app.request("GET", "/api/screenings/9999", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), "SCREENING_NOT_FOUND");
}

#[tokio::test]
async fn test_update_and_delete_screening() {
    let app = TestApp::new().await;
    let id = app.create_screening(Duration::days(1)).await;
    let start = base_time() + Duration::days(1) + Duration::hours(1);
    let path = format!("/api/screenings/{id}");

    let updated = app
        .request(
            "PUT",
            &path,
            Some(serde_json::json!({
                "startTime": start,
                "endTime": start + Duration::hours(2),
                "price": "14.00",
            })),
            Some(&app.admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["price"], "14.00");

    let denied = app.request("DELETE", &path, None, Some(&app.user)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = app.request("DELETE", &path, None, Some(&app.admin)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.request("GET", &path, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reconcile_reports_consistent_counter() {
    let app = TestApp::new().await;
    let id = app.create_screening(Duration::days(1)).await;
    app.reserve(&app.user, id, &[(1, 1), (1, 2)]).await;

    let report = app
        .request(
            "POST",
            &format!("/api/screenings/{id}/reconcile"),
            None,
            Some(&app.admin),
        )
        .await;

    assert_eq!(report.status, StatusCode::OK);
    assert_eq!(report.data()["driftDetected"], false);
    assert_eq!(report.data()["activeSeats"], 2);
    assert_eq!(report.data()["expectedAvailable"], 198);
}
