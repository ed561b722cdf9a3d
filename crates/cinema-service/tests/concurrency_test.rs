//! Concurrent reservation requests against one screening.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;

use cinema_core::ErrorKind;
use cinema_core::types::SeatPosition;
use cinema_service::CreateReservation;

use common::{Fixture, seats};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_last_seat_goes_to_exactly_one_request() {
    let fx = Arc::new(Fixture::with_hall(1, 2).await);
    let screening = fx.screening_in(Duration::days(1)).await;
    let screening_id = screening.id;
    fx.reservations
        .create_reservation(fx.request(screening.id, &[(1, 1)]))
        .await
        .unwrap();

    let users = [fx.user.id, fx.other_user.id];
    let handles = users.map(|user_id| {
        let reservations = Arc::clone(&fx.reservations);
        tokio::spawn(async move {
            reservations
                .create_reservation(CreateReservation {
                    user_id,
                    screening_id,
                    seats: seats(&[(1, 2)]),
                })
                .await
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one request fails");
    assert_eq!(failure.kind, ErrorKind::SeatNotAvailable);

    assert_eq!(fx.available(screening.id).await, 0);
    fx.assert_capacity_invariant(screening.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_overlapping_requests_never_double_book() {
    let fx = Arc::new(Fixture::with_hall(2, 5).await);
    let screening = fx.screening_in(Duration::days(1)).await;
    let screening_id = screening.id;

    // Request n wants seats n and n+1 of row 1 or 2, so neighbours overlap.
    let handles = (0..10).map(|n| {
        let reservations = Arc::clone(&fx.reservations);
        let user_id = if n % 2 == 0 { fx.user.id } else { fx.other_user.id };
        let row = n / 5 + 1;
        let seat = n % 5 + 1;
        let mut wanted = vec![SeatPosition::new(row, seat)];
        if seat < 5 {
            wanted.push(SeatPosition::new(row, seat + 1));
        }
        tokio::spawn(async move {
            reservations
                .create_reservation(CreateReservation {
                    user_id,
                    screening_id,
                    seats: wanted,
                })
                .await
        })
    });

    let mut booked = 0;
    for joined in join_all(handles).await {
        match joined.expect("task panicked") {
            Ok(details) => booked += details.seats.len(),
            Err(err) => assert_eq!(err.kind, ErrorKind::SeatNotAvailable),
        }
    }

    let occupied = fx.occupied(screening.id).await;
    let unique: HashSet<_> = occupied.iter().collect();
    assert_eq!(unique.len(), occupied.len(), "a seat was booked twice");
    assert_eq!(occupied.len(), booked);
    assert_eq!(fx.available(screening.id).await, 10 - booked as i32);
    fx.assert_capacity_invariant(screening.id).await;
}
