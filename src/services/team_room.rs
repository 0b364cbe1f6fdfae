use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    Branch, CreateTeamRoomInput, Notification, NotificationType, Page, PageRequest,
    RelatedEntity, Team, TeamRoom, TeamRoomDetail, TeamRoomFilter, TeamRoomStatus, TeamSummary,
};
use crate::services::conflict::{team_has_team_conflict, team_members_have_individual_conflict};
use crate::services::error::{BookingError, BookingResult};
use crate::services::notifier::{NotificationSink, dispatch};
use crate::services::time_window::{parse_slot, validate_booking_window};
use crate::services::{SharedClock, finish, local_now};
use crate::store::{BookingStore, StoreTx};

#[derive(Clone)]
pub struct TeamRoomService {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: SharedClock,
}

impl TeamRoomService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: SharedClock,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    pub async fn create_room(&self, caller: Uuid, input: CreateTeamRoomInput) -> BookingResult<TeamRoom> {
        let now = local_now(&self.clock);
        let mut tx = self.store.begin().await?;
        let result = create_room_in_tx(tx.as_mut(), caller, input, now).await;
        let room = finish(tx, result).await?;

        log::info!(
            "Team {} created team room {} on {} {}-{} (team size {})",
            room.creator_team_id,
            room.id,
            room.scheduled_date,
            room.start_time,
            room.end_time,
            room.required_team_size
        );
        Ok(room)
    }

    pub async fn join_room(&self, caller: Uuid, room_id: Uuid, opponent_team_id: Uuid) -> BookingResult<TeamRoom> {
        let mut tx = self.store.begin().await?;
        let result = join_room_in_tx(tx.as_mut(), caller, room_id, opponent_team_id).await;
        let (room, notifications) = finish(tx, result).await?;

        log::info!(
            "Team {} joined team room {} as opponent",
            opponent_team_id,
            room_id
        );
        dispatch(&self.notifier, notifications).await;
        Ok(room)
    }

    pub async fn cancel_room(&self, caller: Uuid, room_id: Uuid) -> BookingResult<TeamRoom> {
        let mut tx = self.store.begin().await?;
        let result = cancel_room_in_tx(tx.as_mut(), caller, room_id).await;
        let room = finish(tx, result).await?;

        log::info!("Team room {} cancelled by captain {}", room_id, caller);
        Ok(room)
    }

    pub async fn get_room(&self, room_id: Uuid) -> BookingResult<TeamRoomDetail> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<TeamRoomDetail> = async {
            let room = tx
                .find_team_room(room_id)
                .await?
                .ok_or(BookingError::RoomNotFound)?;
            let mut details = describe(tx.as_mut(), vec![room]).await?;
            details.pop().ok_or(BookingError::RoomNotFound)
        }
        .await;
        finish(tx, result).await
    }

    pub async fn list_rooms(
        &self,
        filter: TeamRoomFilter,
        page: PageRequest,
    ) -> BookingResult<Page<TeamRoomDetail>> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Page<TeamRoomDetail>> = async {
            let (rooms, total) = tx.list_team_rooms(&filter, page).await?;
            let items = describe(tx.as_mut(), rooms).await?;
            Ok(Page::new(items, total, page))
        }
        .await;
        finish(tx, result).await
    }
}

async fn create_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    input: CreateTeamRoomInput,
    now: NaiveDateTime,
) -> BookingResult<TeamRoom> {
    let branch = tx
        .find_branch(input.branch_id)
        .await?
        .filter(|b| b.is_active)
        .ok_or(BookingError::BranchInactive)?;

    let team = tx
        .lock_team(input.team_id)
        .await?
        .filter(Team::is_active)
        .ok_or(BookingError::TeamNotFound)?;

    if !team.is_captain(caller) {
        return Err(BookingError::NotCaptain);
    }

    let members = tx.list_team_members(team.id).await?;
    if !team.has_full_roster(members.len() as i64) {
        return Err(BookingError::TeamNotFullRoster {
            roster_size: team.roster_size,
        });
    }

    let slot = parse_slot(&input.scheduled_date, &input.start_time, &input.end_time)?;
    validate_booking_window(&slot, branch.operating_hours(), now)?;

    if team_has_team_conflict(tx, team.id, &slot).await? {
        return Err(BookingError::TeamConflict);
    }

    let member_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
    if team_members_have_individual_conflict(tx, &member_ids, &slot).await? {
        return Err(BookingError::TeamMembersConflict);
    }

    let created_at = Utc::now();
    let room = TeamRoom {
        id: Uuid::new_v4(),
        branch_id: branch.id,
        creator_team_id: team.id,
        opponent_team_id: None,
        scheduled_date: slot.date,
        start_time: slot.start,
        end_time: slot.end,
        required_team_size: team.roster_size,
        status: TeamRoomStatus::Open,
        created_at,
        updated_at: created_at,
    };
    tx.insert_team_room(&room).await?;

    Ok(room)
}

async fn join_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    room_id: Uuid,
    opponent_team_id: Uuid,
) -> BookingResult<(TeamRoom, Vec<Notification>)> {
    let mut room = tx
        .lock_team_room(room_id)
        .await?
        .filter(|r| !r.is_cancelled())
        .ok_or(BookingError::RoomNotFound)?;

    if room.status == TeamRoomStatus::Matched {
        return Err(BookingError::RoomAlreadyMatched);
    }

    let opponent = tx
        .lock_team(opponent_team_id)
        .await?
        .filter(Team::is_active)
        .ok_or(BookingError::TeamNotFound)?;

    if !opponent.is_captain(caller) {
        return Err(BookingError::NotCaptain);
    }

    if opponent.id == room.creator_team_id {
        return Err(BookingError::CannotJoinOwnRoom);
    }

    if opponent.roster_size != room.required_team_size {
        return Err(BookingError::TeamSizeMismatch {
            required: room.required_team_size,
        });
    }

    let members = tx.list_team_members(opponent.id).await?;
    if !opponent.has_full_roster(members.len() as i64) {
        return Err(BookingError::TeamNotFullRoster {
            roster_size: opponent.roster_size,
        });
    }

    let slot = room.slot();
    if team_has_team_conflict(tx, opponent.id, &slot).await? {
        return Err(BookingError::TeamConflict);
    }

    let member_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
    if team_members_have_individual_conflict(tx, &member_ids, &slot).await? {
        return Err(BookingError::TeamMembersConflict);
    }

    room.opponent_team_id = Some(opponent.id);
    room.status = TeamRoomStatus::Matched;
    room.updated_at = Utc::now();
    tx.update_team_room(&room).await?;

    let mut notifications = Vec::new();
    if let Some(creator) = tx.find_team(room.creator_team_id).await? {
        notifications.push(Notification::new(
            creator.captain_id,
            NotificationType::BookingConfirmation,
            "Match confirmed",
            format!(
                "{} accepted your match on {} at {}",
                opponent.name,
                room.scheduled_date,
                room.start_time.format("%H:%M")
            ),
            (RelatedEntity::TeamRoom, room.id),
        ));
    }

    Ok((room, notifications))
}

async fn cancel_room_in_tx(tx: &mut dyn StoreTx, caller: Uuid, room_id: Uuid) -> BookingResult<TeamRoom> {
    let mut room = tx
        .lock_team_room(room_id)
        .await?
        .ok_or(BookingError::RoomNotFound)?;

    let creator = tx
        .find_team(room.creator_team_id)
        .await?
        .ok_or(BookingError::TeamNotFound)?;

    if !creator.is_captain(caller) {
        return Err(BookingError::NotCreatorCaptain);
    }

    // a matched room may still be called off by the creator
    room.status = TeamRoomStatus::Cancelled;
    room.updated_at = Utc::now();
    tx.update_team_room(&room).await?;

    Ok(room)
}

/// Attaches branch and team summaries to rooms using batched lookups.
/// Attaches the branch name and team summaries to each room, keeping order.
pub(crate) async fn describe(
    tx: &mut dyn StoreTx,
    rooms: Vec<TeamRoom>,
) -> BookingResult<Vec<TeamRoomDetail>> {
    let branch_ids: Vec<Uuid> = rooms.iter().map(|r| r.branch_id).collect();
    let branches: HashMap<Uuid, Branch> = tx
        .find_branches(&branch_ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let mut team_ids: Vec<Uuid> = rooms.iter().map(|r| r.creator_team_id).collect();
    team_ids.extend(rooms.iter().filter_map(|r| r.opponent_team_id));
    team_ids.sort();
    team_ids.dedup();
    let teams = tx.find_teams(&team_ids).await?;
    let counts = tx.team_member_counts(&team_ids).await?;
    let summaries: HashMap<Uuid, TeamSummary> = teams
        .into_iter()
        .map(|team| {
            let members = counts.get(&team.id).copied().unwrap_or(0);
            (team.id, TeamSummary::new(team, members))
        })
        .collect();

    rooms
        .into_iter()
        .map(|room| {
            let branch_name = branches
                .get(&room.branch_id)
                .map(|b| b.name.clone())
                .ok_or(BookingError::BranchNotFound)?;
            let creator_team = summaries
                .get(&room.creator_team_id)
                .cloned()
                .ok_or(BookingError::TeamNotFound)?;
            let opponent_team = room
                .opponent_team_id
                .and_then(|id| summaries.get(&id).cloned());
            Ok(TeamRoomDetail {
                room,
                branch_name,
                creator_team,
                opponent_team,
            })
        })
        .collect()
}
