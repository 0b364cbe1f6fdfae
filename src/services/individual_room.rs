use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::database::models::{
    CreateIndividualRoomInput, IndividualRoom, IndividualRoomDetail, IndividualRoomSummary,
    Notification, NotificationType, Page, PageRequest, Participant, ParticipantView,
    RelatedEntity, RoomFilter, RoomStatus, UserSummary,
};
use crate::services::conflict::user_has_individual_conflict;
use crate::services::error::{BookingError, BookingResult};
use crate::services::notifier::{NotificationSink, dispatch};
use crate::services::time_window::{parse_slot, validate_booking_window};
use crate::services::{SharedClock, ensure_caller, finish, local_now};
use crate::store::{BookingStore, StoreTx};

pub const MIN_TOTAL_SLOTS: i32 = 2;

#[derive(Clone)]
pub struct IndividualRoomService {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: SharedClock,
}

impl IndividualRoomService {
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

    pub async fn create_room(
        &self,
        caller: Uuid,
        input: CreateIndividualRoomInput,
    ) -> BookingResult<IndividualRoomSummary> {
        if input.total_slots < MIN_TOTAL_SLOTS {
            return Err(BookingError::InvalidTotalSlots);
        }

        let now = local_now(&self.clock);
        let mut tx = self.store.begin().await?;
        let result = create_room_in_tx(tx.as_mut(), caller, input, now).await;
        let summary = finish(tx, result).await?;

        log::info!(
            "User {} created individual room {} on {} {}-{}",
            caller,
            summary.room.id,
            summary.room.scheduled_date,
            summary.room.start_time,
            summary.room.end_time
        );
        Ok(summary)
    }

    pub async fn join_room(&self, caller: Uuid, room_id: Uuid) -> BookingResult<IndividualRoomSummary> {
        let mut tx = self.store.begin().await?;
        let result = join_room_in_tx(tx.as_mut(), caller, room_id).await;
        let (summary, notifications) = finish(tx, result).await?;

        log::info!(
            "User {} joined individual room {} ({}/{})",
            caller,
            room_id,
            summary.filled_slots,
            summary.room.total_slots
        );
        dispatch(&self.notifier, notifications).await;
        Ok(summary)
    }

    pub async fn leave_room(&self, caller: Uuid, room_id: Uuid) -> BookingResult<IndividualRoomSummary> {
        let mut tx = self.store.begin().await?;
        let result = leave_room_in_tx(tx.as_mut(), caller, room_id).await;
        let summary = finish(tx, result).await?;

        log::info!("User {} left individual room {}", caller, room_id);
        Ok(summary)
    }

    pub async fn cancel_room(&self, caller: Uuid, room_id: Uuid) -> BookingResult<IndividualRoomSummary> {
        let mut tx = self.store.begin().await?;
        let result = cancel_room_in_tx(tx.as_mut(), caller, room_id).await;
        let summary = finish(tx, result).await?;

        log::info!("User {} cancelled individual room {}", caller, room_id);
        Ok(summary)
    }

    pub async fn get_room(&self, room_id: Uuid) -> BookingResult<IndividualRoomDetail> {
        let mut tx = self.store.begin().await?;
        let result = room_detail(tx.as_mut(), room_id).await;
        finish(tx, result).await
    }

    pub async fn list_rooms(
        &self,
        filter: RoomFilter,
        page: PageRequest,
    ) -> BookingResult<Page<IndividualRoomSummary>> {
        let mut tx = self.store.begin().await?;
        let result = list_rooms_in_tx(tx.as_mut(), &filter, page).await;
        finish(tx, result).await
    }
}

async fn create_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    input: CreateIndividualRoomInput,
    now: NaiveDateTime,
) -> BookingResult<IndividualRoomSummary> {
    ensure_caller(tx, caller).await?;

    let branch = tx
        .find_branch(input.branch_id)
        .await?
        .filter(|b| b.is_active)
        .ok_or(BookingError::BranchInactive)?;

    let slot = parse_slot(&input.scheduled_date, &input.start_time, &input.end_time)?;
    validate_booking_window(&slot, branch.operating_hours(), now)?;

    if user_has_individual_conflict(tx, caller, &slot, None).await? {
        return Err(BookingError::TimeConflict);
    }

    let created_at = Utc::now();
    let mut room = IndividualRoom {
        id: Uuid::new_v4(),
        branch_id: branch.id,
        owner_id: caller,
        scheduled_date: slot.date,
        start_time: slot.start,
        end_time: slot.end,
        total_slots: input.total_slots,
        notes: input.notes.filter(|n| !n.trim().is_empty()),
        status: RoomStatus::Open,
        created_at,
        updated_at: created_at,
    };
    tx.insert_individual_room(&room).await?;
    tx.insert_participant(&Participant {
        room_id: room.id,
        user_id: caller,
        joined_at: created_at,
    })
    .await?;

    let filled = 1;
    apply_status(tx, &mut room, filled).await?;

    Ok(IndividualRoomSummary::new(room, filled))
}

async fn join_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    room_id: Uuid,
) -> BookingResult<(IndividualRoomSummary, Vec<Notification>)> {
    ensure_caller(tx, caller).await?;

    let mut room = tx
        .lock_individual_room(room_id)
        .await?
        .filter(|r| !r.is_cancelled())
        .ok_or(BookingError::RoomNotFound)?;

    if room.status == RoomStatus::Full {
        return Err(BookingError::RoomFull);
    }

    let filled = tx.count_participants(room.id).await?;
    if filled >= i64::from(room.total_slots) {
        return Err(BookingError::RoomFull);
    }

    if tx.is_participant(room.id, caller).await? {
        return Err(BookingError::AlreadyJoined);
    }

    if user_has_individual_conflict(tx, caller, &room.slot(), None).await? {
        return Err(BookingError::TimeConflict);
    }

    tx.insert_participant(&Participant {
        room_id: room.id,
        user_id: caller,
        joined_at: Utc::now(),
    })
    .await?;

    let filled = filled + 1;
    let previous = room.status;
    apply_status(tx, &mut room, filled).await?;

    let related = (RelatedEntity::IndividualRoom, room.id);
    let mut notifications = vec![Notification::new(
        room.owner_id,
        NotificationType::RoomJoined,
        "New player joined",
        format!(
            "A player joined your room on {} at {} ({}/{} slots filled)",
            room.scheduled_date,
            room.start_time.format("%H:%M"),
            filled,
            room.total_slots
        ),
        related,
    )];
    if previous != RoomStatus::Full && room.status == RoomStatus::Full {
        notifications.push(Notification::new(
            room.owner_id,
            NotificationType::RoomFull,
            "Room is full",
            format!(
                "Your room on {} at {} is now full",
                room.scheduled_date,
                room.start_time.format("%H:%M")
            ),
            related,
        ));
    }

    Ok((IndividualRoomSummary::new(room, filled), notifications))
}

async fn leave_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    room_id: Uuid,
) -> BookingResult<IndividualRoomSummary> {
    let mut room = tx
        .lock_individual_room(room_id)
        .await?
        .ok_or(BookingError::RoomNotFound)?;

    if room.owner_id == caller {
        return Err(BookingError::OwnerCannotLeave);
    }

    if !tx.is_participant(room.id, caller).await? {
        return Err(BookingError::NotParticipant);
    }

    tx.delete_participant(room.id, caller).await?;

    let filled = tx.count_participants(room.id).await?;
    apply_status(tx, &mut room, filled).await?;

    Ok(IndividualRoomSummary::new(room, filled))
}

async fn cancel_room_in_tx(
    tx: &mut dyn StoreTx,
    caller: Uuid,
    room_id: Uuid,
) -> BookingResult<IndividualRoomSummary> {
    let mut room = tx
        .lock_individual_room(room_id)
        .await?
        .ok_or(BookingError::RoomNotFound)?;

    if room.owner_id != caller {
        return Err(BookingError::NotOwner);
    }

    room.status = RoomStatus::Cancelled;
    room.updated_at = Utc::now();
    tx.update_individual_room(&room).await?;

    // participant rows stay as history
    let filled = tx.count_participants(room.id).await?;
    Ok(IndividualRoomSummary::new(room, filled))
}

/// Runs the capacity state machine after a membership change and persists
/// the new status when it moved.
async fn apply_status(
    tx: &mut dyn StoreTx,
    room: &mut IndividualRoom,
    filled: i64,
) -> BookingResult<()> {
    let next = room.recompute_status(filled);
    if next != room.status {
        room.status = next;
        room.updated_at = Utc::now();
        tx.update_individual_room(room).await?;
    }
    Ok(())
}

async fn room_detail(tx: &mut dyn StoreTx, room_id: Uuid) -> BookingResult<IndividualRoomDetail> {
    let room = tx
        .find_individual_room(room_id)
        .await?
        .ok_or(BookingError::RoomNotFound)?;
    let branch = tx
        .find_branch(room.branch_id)
        .await?
        .ok_or(BookingError::BranchNotFound)?;

    let participants = tx.list_participants(room.id).await?;
    let filled = participants.len() as i64;
    let mut user_ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
    if !user_ids.contains(&room.owner_id) {
        user_ids.push(room.owner_id);
    }
    let users: HashMap<Uuid, UserSummary> = tx
        .find_users(&user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let owner = users
        .get(&room.owner_id)
        .cloned()
        .ok_or(BookingError::UserNotFound)?;
    let participants: Vec<ParticipantView> = participants
        .into_iter()
        .filter_map(|p| {
            users.get(&p.user_id).map(|user| ParticipantView {
                user: user.clone(),
                joined_at: p.joined_at,
            })
        })
        .collect();

    Ok(IndividualRoomDetail {
        summary: IndividualRoomSummary::new(room, filled),
        branch_name: branch.name,
        owner,
        participants,
    })
}

async fn list_rooms_in_tx(
    tx: &mut dyn StoreTx,
    filter: &RoomFilter,
    page: PageRequest,
) -> BookingResult<Page<IndividualRoomSummary>> {
    let (rooms, total) = tx.list_individual_rooms(filter, page).await?;
    let ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
    let counts = tx.participant_counts(&ids).await?;

    let items = rooms
        .into_iter()
        .map(|room| {
            let filled = counts.get(&room.id).copied().unwrap_or(0);
            IndividualRoomSummary::new(room, filled)
        })
        .collect();
    Ok(Page::new(items, total, page))
}
