use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::database::models::{TeamSummary, TimeSlot};

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TeamRoomStatus {
        Open => "OPEN",
        Matched => "MATCHED",
        Cancelled => "CANCELLED",
    }
}

/// A match slot created by one team and claimed by exactly one opponent.
/// `required_team_size` is the creator's roster size when the room was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoom {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub creator_team_id: Uuid,
    pub opponent_team_id: Option<Uuid>,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub required_team_size: i32,
    pub status: TeamRoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamRoom {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.scheduled_date, self.start_time, self.end_time)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == TeamRoomStatus::Cancelled
    }

    pub fn involves(&self, team_id: Uuid) -> bool {
        self.creator_team_id == team_id || self.opponent_team_id == Some(team_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRoomInput {
    pub branch_id: Uuid,
    pub team_id: Uuid,
    pub scheduled_date: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamRoomInput {
    pub team_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoomFilter {
    pub branch_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub team_size: Option<i32>,
    pub status: Option<TeamRoomStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoomDetail {
    #[serde(flatten)]
    pub room: TeamRoom,
    pub branch_name: String,
    pub creator_team: TeamSummary,
    pub opponent_team: Option<TeamSummary>,
}
