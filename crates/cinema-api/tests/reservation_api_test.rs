//! HTTP tests for the reservation endpoints.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;

use helpers::TestApp;

#[tokio::test]
async fn test_create_reservation() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;

    let response = app.reserve(&app.user, screening_id, &[(5, 10), (5, 11)]).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let data = response.data();
    assert_eq!(data["status"], "PENDING");
    assert_eq!(data["totalPrice"], "24.00");
    assert_eq!(data["seats"].as_array().map(Vec::len), Some(2));
    assert!(
        data["confirmationCode"]
            .as_str()
            .is_some_and(|c| c.starts_with("RES"))
    );

    let availability = app
        .request(
            "GET",
            &format!("/api/screenings/{screening_id}/availability"),
            None,
            None,
        )
        .await;
    assert_eq!(availability.status, StatusCode::OK);
    assert_eq!(availability.data()["availableSeats"], 198);
}

#[tokio::test]
async fn test_taken_seat_is_conflict() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;
    app.reserve(&app.user, screening_id, &[(5, 10)]).await;

    let response = app
        .reserve(&app.other_user, screening_id, &[(5, 10), (5, 11)])
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "SEAT_NOT_AVAILABLE");
}

#[tokio::test]
async fn test_malformed_requests_are_bad_request() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;

    let missing_user = app
        .request(
            "POST",
            "/api/reservations",
            Some(serde_json::json!({
                "screeningId": screening_id,
                "seats": [{ "rowNumber": 1, "seatNumber": 1 }],
            })),
            Some(&app.admin),
        )
        .await;
    assert_eq!(missing_user.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_user.error_code(), "INVALID_RESERVATION_DATA");

    let no_seats = app.reserve(&app.user, screening_id, &[]).await;
    assert_eq!(no_seats.status, StatusCode::BAD_REQUEST);

    let too_many: Vec<(i32, i32)> = (1..=11).map(|s| (1, s)).collect();
    let response = app.reserve(&app.user, screening_id, &too_many).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_RESERVATION_DATA");
}

#[tokio::test]
async fn test_identity_headers_required() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;

    let response = app
        .request(
            "POST",
            "/api/reservations",
            Some(serde_json::json!({
                "userId": app.user.id,
                "screeningId": screening_id,
                "seats": [{ "rowNumber": 1, "seatNumber": 1 }],
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_cannot_book_for_someone_else() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;

    let response = app
        .request(
            "POST",
            "/api/reservations",
            Some(serde_json::json!({
                "userId": app.other_user.id,
                "screeningId": screening_id,
                "seats": [{ "rowNumber": 1, "seatNumber": 1 }],
            })),
            Some(&app.user),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_and_admin_can_read_reservation() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;
    let created = app.reserve(&app.user, screening_id, &[(2, 2)]).await;
    let id = created.data()["id"].as_i64().expect("reservation id");
    let code = created.data()["confirmationCode"]
        .as_str()
        .expect("code")
        .to_string();
    let path = format!("/api/reservations/{id}");

    assert_eq!(app.request("GET", &path, None, Some(&app.user)).await.status, StatusCode::OK);
    assert_eq!(app.request("GET", &path, None, Some(&app.admin)).await.status, StatusCode::OK);
    assert_eq!(
        app.request("GET", &path, None, Some(&app.other_user)).await.status,
        StatusCode::FORBIDDEN
    );

    let by_code = app
        .request(
            "GET",
            &format!("/api/reservations/confirmation/{code}"),
            None,
            Some(&app.other_user),
        )
        .await;
    assert_eq!(by_code.status, StatusCode::OK);
    assert_eq!(by_code.data()["id"], id);

    let missing = app
        .request("GET", "/api/reservations/9999", None, Some(&app.admin))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error_code(), "RESERVATION_NOT_FOUND");
}

#[tokio::test]
async fn test_list_user_reservations() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;
    app.reserve(&app.user, screening_id, &[(1, 1)]).await;
    app.reserve(&app.user, screening_id, &[(1, 2)]).await;

    let path = format!("/api/reservations/user/{}", app.user.id);
    let own = app.request("GET", &path, None, Some(&app.user)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.data().as_array().map(Vec::len), Some(2));

    let other = app.request("GET", &path, None, Some(&app.other_user)).await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_confirm_is_admin_only_and_once() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;
    let created = app.reserve(&app.user, screening_id, &[(3, 3)]).await;
    let id = created.data()["id"].as_i64().expect("reservation id");
    let path = format!("/api/reservations/{id}/confirm");

    let denied = app.request("PUT", &path, None, Some(&app.user)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let confirmed = app.request("PUT", &path, None, Some(&app.admin)).await;
    assert_eq!(confirmed.status, StatusCode::OK);
    assert_eq!(confirmed.data()["status"], "CONFIRMED");

    let again = app.request("PUT", &path, None, Some(&app.admin)).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error_code(), "INVALID_RESERVATION_STATE");
}

#[tokio::test]
async fn test_cancel_respects_cutoff() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::hours(3)).await;
    let early = app.reserve(&app.user, screening_id, &[(4, 4)]).await;
    let late = app.reserve(&app.user, screening_id, &[(4, 5)]).await;
    let early_id = early.data()["id"].as_i64().expect("id");
    let late_id = late.data()["id"].as_i64().expect("id");

    let denied = app
        .request(
            "PUT",
            &format!("/api/reservations/{early_id}/cancel"),
            None,
            Some(&app.other_user),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let cancelled = app
        .request(
            "PUT",
            &format!("/api/reservations/{early_id}/cancel"),
            None,
            Some(&app.user),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["status"], "CANCELLED");

    app.clock.advance(Duration::hours(2));
    let refused = app
        .request(
            "PUT",
            &format!("/api/reservations/{late_id}/cancel"),
            None,
            Some(&app.user),
        )
        .await;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(refused.error_code(), "RESERVATION_CANCELLATION");
}

#[tokio::test]
async fn test_statistics_admin_only() {
    let app = TestApp::new().await;
    let screening_id = app.create_screening(Duration::days(1)).await;
    app.reserve(&app.user, screening_id, &[(1, 1)]).await;

    let denied = app
        .request("GET", "/api/reservations/statistics", None, Some(&app.user))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let stats = app
        .request("GET", "/api/reservations/statistics", None, Some(&app.admin))
        .await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.data()["createdLast7Days"], 1);
    assert_eq!(stats.data()["confirmedToday"], 0);
}
