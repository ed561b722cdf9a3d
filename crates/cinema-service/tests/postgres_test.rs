//! End-to-end lifecycle against PostgreSQL.
//!
//! Runs only when `DATABASE_URL` points at a database the tests may write to.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use cinema_core::ErrorKind;
use cinema_core::config::{BookingConfig, DatabaseConfig};
use cinema_core::traits::{Clock, SystemClock};
use cinema_core::types::{HallId, MovieId, SeatPosition, UserId};
use cinema_database::DatabasePool;
use cinema_database::migration::run_migrations;
use cinema_entity::reservation::ReservationStatus;
use cinema_entity::screening::NewScreening;
use cinema_service::{
    BookingStore, BookingTx, CreateReservation, CreateScreening, PgBookingStore,
    ReservationService, ScreeningService, UpdateScreening,
};

async fn connect() -> Option<DatabasePool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = DatabasePool::connect(&DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        connect_timeout_seconds: 5,
        idle_timeout_seconds: 60,
        run_migrations: true,
    })
    .await
    .expect("Failed to connect to test database");
    run_migrations(db.pool())
        .await
        .expect("Failed to run migrations");
    Some(db)
}

async fn seed(db: &DatabasePool) -> (UserId, MovieId, HallId) {
    let suffix = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, role) VALUES ($1, $2, 'USER') RETURNING id",
    )
    .bind(format!("pg-user-{suffix}"))
    .bind(format!("pg-user-{suffix}@test.com"))
    .fetch_one(db.pool())
    .await
    .expect("insert user");
    let movie_id: i64 = sqlx::query_scalar(
        "INSERT INTO movies (title, duration_minutes) VALUES ('Solaris', 167) RETURNING id",
    )
    .fetch_one(db.pool())
    .await
    .expect("insert movie");
    let hall_id: i64 = sqlx::query_scalar(
        "INSERT INTO cinema_halls (name, rows, seats_per_row, total_seats, hall_type) \
         VALUES ($1, 2, 3, 6, 'STANDARD') RETURNING id",
    )
    .bind(format!("pg-hall-{suffix}"))
    .fetch_one(db.pool())
    .await
    .expect("insert hall");
    (UserId::new(user_id), MovieId::new(movie_id), HallId::new(hall_id))
}

#[tokio::test]
async fn test_postgres_reservation_lifecycle() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let (user_id, movie_id, hall_id) = seed(&db).await;

    let store = Arc::new(PgBookingStore::new(db));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let screenings = ScreeningService::new(Arc::clone(&store), Arc::clone(&clock));
    let reservations = ReservationService::new(store, clock, BookingConfig::default());

    let start = Utc::now() + Duration::days(30);
    let screening = screenings
        .create_screening(CreateScreening {
            movie_id,
            hall_id,
            start_time: start,
            end_time: start + Duration::hours(3),
            price: Decimal::new(1550, 2),
        })
        .await
        .expect("create screening");
    assert_eq!(screening.capacity, 6);

    let err = screenings
        .create_screening(CreateScreening {
            movie_id,
            hall_id,
            start_time: start + Duration::hours(3),
            end_time: start + Duration::hours(5),
            price: Decimal::new(1550, 2),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ScreeningConflict);

    let created = reservations
        .create_reservation(CreateReservation {
            user_id,
            screening_id: screening.id,
            seats: vec![SeatPosition::new(1, 1), SeatPosition::new(1, 2)],
        })
        .await
        .expect("create reservation");
    assert_eq!(created.reservation.total_price, Decimal::new(3100, 2));

    let err = reservations
        .create_reservation(CreateReservation {
            user_id,
            screening_id: screening.id,
            seats: vec![SeatPosition::new(1, 2), SeatPosition::new(1, 3)],
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::SeatNotAvailable);

    let availability = screenings.availability(screening.id).await.unwrap();
    assert_eq!(availability.available_seats, 4);
    assert_eq!(availability.occupied_seats.len(), 2);

    let confirmed = reservations
        .confirm_reservation(created.reservation.id)
        .await
        .unwrap();
    assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);

    let cancelled = reservations
        .cancel_reservation(created.reservation.id)
        .await
        .unwrap();
    assert_eq!(cancelled.reservation.status, ReservationStatus::Cancelled);
    assert!(cancelled.seats.iter().all(|s| !s.active));

    let report = screenings.reconcile_capacity(screening.id).await.unwrap();
    assert!(!report.drift_detected);
    assert_eq!(report.expected_available, 6);

    screenings.delete_screening(screening.id).await.unwrap();
}

#[tokio::test]
async fn test_postgres_update_waits_for_concurrent_create_in_hall() {
    let Some(db) = connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let (_, movie_id, hall_id) = seed(&db).await;

    let store = Arc::new(PgBookingStore::new(db));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let screenings = Arc::new(ScreeningService::new(Arc::clone(&store), clock));

    let base = Utc::now() + Duration::days(40);
    let movable = screenings
        .create_screening(CreateScreening {
            movie_id,
            hall_id,
            start_time: base + Duration::hours(20),
            end_time: base + Duration::hours(22),
            price: Decimal::new(1000, 2),
        })
        .await
        .expect("create screening");

    // A create holding the hall lock with its insert not yet committed.
    let mut tx = store.begin().await.expect("begin");
    tx.lock_hall(hall_id).await.expect("lock hall").expect("hall exists");
    let overlapping = tx
        .find_conflicting_screenings(
            hall_id,
            base + Duration::hours(10),
            base + Duration::hours(12),
            None,
        )
        .await
        .expect("conflict query");
    assert!(overlapping.is_empty());
    tx.insert_screening(&NewScreening {
        movie_id,
        hall_id,
        start_time: base + Duration::hours(10),
        end_time: base + Duration::hours(12),
        price: Decimal::new(1000, 2),
        capacity: 6,
        created_at: Utc::now(),
    })
    .await
    .expect("insert screening");

    let service = Arc::clone(&screenings);
    let movable_id = movable.id;
    let mut update = tokio::spawn(async move {
        service
            .update_screening(
                movable_id,
                UpdateScreening {
                    start_time: base + Duration::hours(11),
                    end_time: base + Duration::hours(13),
                    price: Decimal::new(1000, 2),
                    hall_id: None,
                },
            )
            .await
    });

    let waited = tokio::time::timeout(std::time::Duration::from_millis(300), &mut update).await;
    assert!(waited.is_err(), "update must wait for the hall lock");

    tx.commit().await.expect("commit");
    let err = update.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::ScreeningConflict);

    let unchanged = screenings.find_by_id(movable_id).await.unwrap();
    assert_eq!(unchanged.start_time, movable.start_time);
}
