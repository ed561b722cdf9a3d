//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use cinema_core::config::BookingConfig;
use cinema_core::traits::{Clock, FixedClock};
use cinema_core::types::{ScreeningId, SeatPosition};
use cinema_entity::hall::{CinemaHall, HallType};
use cinema_entity::movie::Movie;
use cinema_entity::screening::Screening;
use cinema_entity::user::{User, UserRole};
use cinema_service::{
    BookingStore, CreateReservation, CreateScreening, MemoryBookingStore, ReservationService,
    ScreeningService,
};

/// A memory-backed service stack frozen at a fixed instant.
pub struct Fixture {
    pub store: Arc<MemoryBookingStore>,
    pub clock: Arc<FixedClock>,
    pub reservations: Arc<ReservationService<MemoryBookingStore>>,
    pub screenings: Arc<ScreeningService<MemoryBookingStore>>,
    pub user: User,
    pub other_user: User,
    pub admin: User,
    pub movie: Movie,
    pub hall: CinemaHall,
}

/// 2030-06-01 09:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn seats(positions: &[(i32, i32)]) -> Vec<SeatPosition> {
    positions
        .iter()
        .map(|&(row, seat)| SeatPosition::new(row, seat))
        .collect()
}

impl Fixture {
    /// Fixture with a 10 x 20 hall.
    pub async fn new() -> Self {
        Self::with_hall(10, 20).await
    }

    /// Fixture with a `rows` x `seats_per_row` hall.
    pub async fn with_hall(rows: i32, seats_per_row: i32) -> Self {
        let store = Arc::new(MemoryBookingStore::new());
        let clock = Arc::new(FixedClock::new(base_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();

        let user = store.add_user("alice", UserRole::User).await;
        let other_user = store.add_user("carol", UserRole::User).await;
        let admin = store.add_user("root", UserRole::Admin).await;
        let movie = store.add_movie("Dune", 155).await;
        let hall = store
            .add_hall("Hall A", rows, seats_per_row, HallType::Standard)
            .await;

        let reservations = Arc::new(ReservationService::new(
            Arc::clone(&store),
            Arc::clone(&dyn_clock),
            BookingConfig::default(),
        ));
        let screenings = Arc::new(ScreeningService::new(Arc::clone(&store), dyn_clock));

        Self {
            store,
            clock,
            reservations,
            screenings,
            user,
            other_user,
            admin,
            movie,
            hall,
        }
    }

    /// Schedule a two-hour screening at 15.50 starting `offset` from now.
    pub async fn screening_in(&self, offset: Duration) -> Screening {
        let start = base_time() + offset;
        self.screenings
            .create_screening(CreateScreening {
                movie_id: self.movie.id,
                hall_id: self.hall.id,
                start_time: start,
                end_time: start + Duration::hours(2),
                price: price(1550),
            })
            .await
            .expect("screening should be created")
    }

    pub fn request(&self, screening_id: ScreeningId, positions: &[(i32, i32)]) -> CreateReservation {
        CreateReservation {
            user_id: self.user.id,
            screening_id,
            seats: seats(positions),
        }
    }

    pub async fn available(&self, screening_id: ScreeningId) -> i32 {
        self.store
            .find_screening(screening_id)
            .await
            .expect("query")
            .expect("screening exists")
            .available_seats
    }

    pub async fn occupied(&self, screening_id: ScreeningId) -> Vec<SeatPosition> {
        self.store.occupied_seats(screening_id).await.expect("query")
    }

    /// `available_seats == capacity - active seats`.
    pub async fn assert_capacity_invariant(&self, screening_id: ScreeningId) {
        let screening = self
            .store
            .find_screening(screening_id)
            .await
            .expect("query")
            .expect("screening exists");
        let occupied = self.store.occupied_seats(screening_id).await.expect("query");
        assert_eq!(
            screening.available_seats,
            screening.capacity - occupied.len() as i32,
            "counter drifted from active seats"
        );
    }
}
