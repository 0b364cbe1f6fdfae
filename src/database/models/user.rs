use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a user account the booking core needs for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
}
