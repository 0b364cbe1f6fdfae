use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::database::models::UserSummary;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TeamStatus {
        Active => "ACTIVE",
        Disbanded => "DISBANDED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub captain_id: Uuid,
    pub roster_size: i32,
    pub status: TeamStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn is_active(&self) -> bool {
        self.status == TeamStatus::Active
    }

    pub fn is_captain(&self, user_id: Uuid) -> bool {
        self.captain_id == user_id
    }

    pub fn has_full_roster(&self, member_count: i64) -> bool {
        member_count >= i64::from(self.roster_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamInput {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub roster_size: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,
    pub member_count: i64,
    pub available_slots: i64,
}

impl TeamSummary {
    pub fn new(team: Team, member_count: i64) -> Self {
        let available_slots = (i64::from(team.roster_size) - member_count).max(0);
        Self {
            team,
            member_count,
            available_slots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    #[serde(flatten)]
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
    pub is_captain: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(flatten)]
    pub summary: TeamSummary,
    pub members: Vec<MemberView>,
}
