use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::database::models::{
    AWAITING_OPPONENT, Booking, BookingDetails, BookingScope, BookingType, IndividualRoom,
    TeamRoom,
};
use crate::services::error::{BookingError, BookingResult};
use crate::services::{SharedClock, finish, local_now};
use crate::store::{BookingStore, StoreTx};

/// Read-only merge of a user's individual and team bookings.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    clock: SharedClock,
}

impl BookingService {
    pub fn new(store: Arc<dyn BookingStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    pub async fn get_bookings(&self, caller: Uuid, scope: BookingScope) -> BookingResult<Vec<Booking>> {
        let now = local_now(&self.clock);
        let mut tx = self.store.begin().await?;
        let result = collect_bookings(tx.as_mut(), caller).await;
        let bookings = finish(tx, result).await?;

        Ok(select(bookings, scope, now))
    }
}

/// Applies the scope window and ordering. "Upcoming" includes a booking that
/// starts exactly now; "past" is its strict complement.
pub fn select(bookings: Vec<Booking>, scope: BookingScope, now: NaiveDateTime) -> Vec<Booking> {
    let is_upcoming = |b: &Booking| b.scheduled_date.and_time(b.start_time) >= now;

    let mut selected: Vec<Booking> = match scope {
        BookingScope::All => bookings,
        BookingScope::Upcoming => bookings
            .into_iter()
            .filter(|b| !b.is_cancelled() && is_upcoming(b))
            .collect(),
        BookingScope::Past => bookings
            .into_iter()
            .filter(|b| !b.is_cancelled() && !is_upcoming(b))
            .collect(),
    };

    match scope {
        BookingScope::Upcoming => selected.sort_by_key(Booking::sort_key),
        BookingScope::All | BookingScope::Past => selected.sort_by_key(|b| Reverse(b.sort_key())),
    }
    selected
}

async fn collect_bookings(tx: &mut dyn StoreTx, caller: Uuid) -> BookingResult<Vec<Booking>> {
    let individual = tx.individual_rooms_of_user(caller).await?;
    let team_ids = tx.team_ids_of_user(caller).await?;
    let team_rooms = if team_ids.is_empty() {
        Vec::new()
    } else {
        tx.team_rooms_of_teams(&team_ids).await?
    };

    let mut branch_ids: Vec<Uuid> = individual
        .iter()
        .map(|r| r.branch_id)
        .chain(team_rooms.iter().map(|r| r.branch_id))
        .collect();
    branch_ids.sort();
    branch_ids.dedup();
    let branch_names: HashMap<Uuid, String> = tx
        .find_branches(&branch_ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();

    let mut bookings = Vec::with_capacity(individual.len() + team_rooms.len());
    bookings.extend(individual_bookings(tx, individual, &branch_names).await?);
    bookings.extend(team_bookings(tx, team_rooms, &branch_names).await?);
    Ok(bookings)
}

async fn individual_bookings(
    tx: &mut dyn StoreTx,
    rooms: Vec<IndividualRoom>,
    branch_names: &HashMap<Uuid, String>,
) -> BookingResult<Vec<Booking>> {
    if rooms.is_empty() {
        return Ok(Vec::new());
    }

    let room_ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
    let counts = tx.participant_counts(&room_ids).await?;
    let owner_ids: Vec<Uuid> = rooms.iter().map(|r| r.owner_id).collect();
    let owners: HashMap<Uuid, String> = tx
        .find_users(&owner_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.display_name))
        .collect();

    rooms
        .into_iter()
        .map(|room| {
            Ok(Booking {
                id: room.id,
                booking_type: BookingType::Individual,
                branch_id: room.branch_id,
                branch_name: branch_name(branch_names, room.branch_id)?,
                scheduled_date: room.scheduled_date,
                start_time: room.start_time,
                end_time: room.end_time,
                details: BookingDetails {
                    total_slots: Some(room.total_slots),
                    filled_slots: Some(counts.get(&room.id).copied().unwrap_or(0)),
                    owner_name: owners.get(&room.owner_id).cloned(),
                    ..BookingDetails::default()
                },
                status: room.status.to_string(),
                created_at: room.created_at,
            })
        })
        .collect()
}

async fn team_bookings(
    tx: &mut dyn StoreTx,
    rooms: Vec<TeamRoom>,
    branch_names: &HashMap<Uuid, String>,
) -> BookingResult<Vec<Booking>> {
    if rooms.is_empty() {
        return Ok(Vec::new());
    }

    let mut team_ids: Vec<Uuid> = rooms.iter().map(|r| r.creator_team_id).collect();
    team_ids.extend(rooms.iter().filter_map(|r| r.opponent_team_id));
    team_ids.sort();
    team_ids.dedup();
    let team_names: HashMap<Uuid, String> = tx
        .find_teams(&team_ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    rooms
        .into_iter()
        .map(|room| {
            let opponent_team_name = match room.opponent_team_id {
                Some(id) => team_names.get(&id).cloned(),
                None => Some(AWAITING_OPPONENT.to_string()),
            };
            Ok(Booking {
                id: room.id,
                booking_type: BookingType::Team,
                branch_id: room.branch_id,
                branch_name: branch_name(branch_names, room.branch_id)?,
                scheduled_date: room.scheduled_date,
                start_time: room.start_time,
                end_time: room.end_time,
                details: BookingDetails {
                    creator_team_name: team_names.get(&room.creator_team_id).cloned(),
                    opponent_team_name,
                    required_team_size: Some(room.required_team_size),
                    ..BookingDetails::default()
                },
                status: room.status.to_string(),
                created_at: room.created_at,
            })
        })
        .collect()
}

fn branch_name(names: &HashMap<Uuid, String>, branch_id: Uuid) -> BookingResult<String> {
    names
        .get(&branch_id)
        .cloned()
        .ok_or(BookingError::BranchNotFound)
}
