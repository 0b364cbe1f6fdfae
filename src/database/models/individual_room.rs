use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::database::models::{TimeSlot, UserSummary};

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RoomStatus {
        Open => "OPEN",
        Full => "FULL",
        Cancelled => "CANCELLED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRoom {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub owner_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub total_slots: i32,
    pub notes: Option<String>,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IndividualRoom {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.scheduled_date, self.start_time, self.end_time)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == RoomStatus::Cancelled
    }

    /// Status implied by the current head count. Cancellation is terminal and
    /// never recomputed away.
    pub fn recompute_status(&self, filled_slots: i64) -> RoomStatus {
        match self.status {
            RoomStatus::Cancelled => RoomStatus::Cancelled,
            _ if filled_slots >= i64::from(self.total_slots) => RoomStatus::Full,
            _ => RoomStatus::Open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndividualRoomInput {
    pub branch_id: Uuid,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
    pub total_slots: i32,
    pub notes: Option<String>,
}

/// Filters for browsing rooms. Cancelled rooms are never listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilter {
    pub branch_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<RoomStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRoomSummary {
    #[serde(flatten)]
    pub room: IndividualRoom,
    pub filled_slots: i64,
    pub available_slots: i64,
}

impl IndividualRoomSummary {
    pub fn new(room: IndividualRoom, filled_slots: i64) -> Self {
        let available_slots = (i64::from(room.total_slots) - filled_slots).max(0);
        Self {
            room,
            filled_slots,
            available_slots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    #[serde(flatten)]
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualRoomDetail {
    #[serde(flatten)]
    pub summary: IndividualRoomSummary,
    pub branch_name: String,
    pub owner: UserSummary,
    pub participants: Vec<ParticipantView>,
}
