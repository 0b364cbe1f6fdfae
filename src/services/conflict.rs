//! Scheduling conflict predicates.
//!
//! Candidates are narrowed by the store to non-cancelled bookings on the same
//! date; the half-open overlap test itself is [`TimeSlot::overlaps`].

use uuid::Uuid;

use crate::database::models::TimeSlot;
use crate::store::{StoreResult, StoreTx};

/// True when the user owns or joined a live individual room overlapping
/// `slot`. `exclude_room` skips one room, e.g. the room being re-checked.
pub async fn user_has_individual_conflict(
    tx: &mut dyn StoreTx,
    user_id: Uuid,
    slot: &TimeSlot,
    exclude_room: Option<Uuid>,
) -> StoreResult<bool> {
    let rooms = tx.individual_bookings_on(&[user_id], slot.date).await?;
    Ok(rooms
        .iter()
        .filter(|room| Some(room.id) != exclude_room)
        .any(|room| room.slot().overlaps(slot)))
}

/// True when the team, as creator or opponent, holds a live team room
/// overlapping `slot`.
pub async fn team_has_team_conflict(
    tx: &mut dyn StoreTx,
    team_id: Uuid,
    slot: &TimeSlot,
) -> StoreResult<bool> {
    let rooms = tx.team_bookings_on(team_id, slot.date).await?;
    Ok(rooms.iter().any(|room| room.slot().overlaps(slot)))
}

/// Batched form of [`user_has_individual_conflict`]: true if any of the
/// users has an overlapping individual booking.
pub async fn team_members_have_individual_conflict(
    tx: &mut dyn StoreTx,
    user_ids: &[Uuid],
    slot: &TimeSlot,
) -> StoreResult<bool> {
    if user_ids.is_empty() {
        return Ok(false);
    }
    let rooms = tx.individual_bookings_on(user_ids, slot.date).await?;
    Ok(rooms.iter().any(|room| room.slot().overlaps(slot)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    use crate::database::models::{IndividualRoom, Participant, RoomStatus};
    use crate::store::{BookingStore, MemoryStore};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    async fn seed_room(
        tx: &mut dyn StoreTx,
        user_id: Uuid,
        start: NaiveTime,
        end: NaiveTime,
        status: RoomStatus,
    ) -> Uuid {
        let now = Utc::now();
        let room = IndividualRoom {
            id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            owner_id: user_id,
            scheduled_date: june_first(),
            start_time: start,
            end_time: end,
            total_slots: 4,
            notes: None,
            status,
            created_at: now,
            updated_at: now,
        };
        tx.insert_individual_room(&room).await.unwrap();
        tx.insert_participant(&Participant {
            room_id: room.id,
            user_id,
            joined_at: now,
        })
        .await
        .unwrap();
        room.id
    }

    #[tokio::test]
    async fn overlapping_room_conflicts_and_touching_room_does_not() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = Uuid::new_v4();
        seed_room(tx.as_mut(), user, at(10, 0), at(11, 0), RoomStatus::Open).await;

        let overlapping = TimeSlot::new(june_first(), at(10, 30), at(11, 30));
        let touching = TimeSlot::new(june_first(), at(11, 0), at(12, 0));

        assert!(
            user_has_individual_conflict(tx.as_mut(), user, &overlapping, None)
                .await
                .unwrap()
        );
        assert!(
            !user_has_individual_conflict(tx.as_mut(), user, &touching, None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn cancelled_and_excluded_rooms_are_ignored() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = Uuid::new_v4();
        seed_room(tx.as_mut(), user, at(9, 0), at(10, 0), RoomStatus::Cancelled).await;
        let live = seed_room(tx.as_mut(), user, at(14, 0), at(15, 0), RoomStatus::Full).await;

        let morning = TimeSlot::new(june_first(), at(9, 0), at(10, 0));
        let afternoon = TimeSlot::new(june_first(), at(14, 0), at(15, 0));

        assert!(
            !user_has_individual_conflict(tx.as_mut(), user, &morning, None)
                .await
                .unwrap()
        );
        assert!(
            !user_has_individual_conflict(tx.as_mut(), user, &afternoon, Some(live))
                .await
                .unwrap()
        );
        assert!(
            team_members_have_individual_conflict(tx.as_mut(), &[Uuid::new_v4(), user], &afternoon)
                .await
                .unwrap()
        );
        assert!(
            !team_members_have_individual_conflict(tx.as_mut(), &[], &afternoon)
                .await
                .unwrap()
        );
    }
}
