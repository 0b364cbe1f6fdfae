use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum BookingType {
        Individual => "INDIVIDUAL",
        Team => "TEAM",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum BookingScope {
        All => "ALL",
        Upcoming => "UPCOMING",
        Past => "PAST",
    }
}

pub const AWAITING_OPPONENT: &str = "Waiting for opponent";

/// Individual rooms fill the slot fields, team rooms fill the team fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub total_slots: Option<i32>,
    pub filled_slots: Option<i64>,
    pub owner_name: Option<String>,
    pub creator_team_name: Option<String>,
    pub opponent_team_name: Option<String>,
    pub required_team_size: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub booking_type: BookingType,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub scheduled_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub details: BookingDetails,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn sort_key(&self) -> (NaiveDate, NaiveTime) {
        (self.scheduled_date, self.start_time)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == "CANCELLED"
    }
}
