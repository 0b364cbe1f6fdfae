pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

pub use config::Config;
pub use services::{
    BookingService, BranchService, IndividualRoomService, NotificationSink, SearchService,
    SharedClock, TeamRoomService, TeamService,
};
pub use store::{BookingStore, MemoryStore};

/// Services shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub branches: BranchService,
    pub individual_rooms: IndividualRoomService,
    pub teams: TeamService,
    pub team_rooms: TeamRoomService,
    pub bookings: BookingService,
    pub search: SearchService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: SharedClock,
    ) -> Self {
        Self {
            branches: BranchService::new(store.clone()),
            individual_rooms: IndividualRoomService::new(
                store.clone(),
                notifier.clone(),
                clock.clone(),
            ),
            teams: TeamService::new(store.clone(), notifier.clone()),
            team_rooms: TeamRoomService::new(store.clone(), notifier, clock.clone()),
            bookings: BookingService::new(store.clone(), clock),
            search: SearchService::new(store),
        }
    }
}
