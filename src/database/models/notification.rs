use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum NotificationType {
        RoomJoined => "ROOM_JOINED",
        RoomFull => "ROOM_FULL",
        TeamInvitation => "TEAM_INVITATION",
        BookingConfirmation => "BOOKING_CONFIRMATION",
        MatchReminder => "MATCH_REMINDER",
        TeamUpdate => "TEAM_UPDATE",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RelatedEntity {
        IndividualRoom => "INDIVIDUAL_ROOM",
        TeamRoom => "TEAM_ROOM",
        Team => "TEAM",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub related_entity_type: RelatedEntity,
    pub related_entity_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
        related: (RelatedEntity, Uuid),
    ) -> Self {
        Self {
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            related_entity_type: related.0,
            related_entity_id: related.1,
            created_at: Utc::now(),
        }
    }
}
