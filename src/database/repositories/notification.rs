use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::Notification, utils::sql};

/// Notifications are written outside the booking transaction, after the
/// change they describe has committed.
pub async fn insert_notification(
    pool: &PgPool,
    notification: &Notification,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(&sql(r#"
            INSERT INTO
                notifications (
                    id,
                    user_id,
                    notification_type,
                    title,
                    message,
                    related_entity_type,
                    related_entity_id,
                    is_read,
                    created_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, FALSE, ?)
        "#))
    .bind(id)
    .bind(notification.user_id)
    .bind(notification.notification_type)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(notification.related_entity_type)
    .bind(notification.related_entity_id)
    .bind(notification.created_at)
    .execute(pool)
    .await?;

    Ok(id)
}
