use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::Notification;
use crate::database::repositories::notification;

/// Best-effort side channel. Delivery happens after the booking transaction
/// has committed; a failed delivery never undoes the booking.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()>;
}

pub async fn dispatch(sink: &Arc<dyn NotificationSink>, notifications: Vec<Notification>) {
    for notification in notifications {
        if let Err(err) = sink.notify(&notification).await {
            log::warn!(
                "Failed to deliver {} notification to user {}: {}",
                notification.notification_type,
                notification.user_id,
                err
            );
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        log::info!(
            "Notification {} for user {}: {} ({} {})",
            notification.notification_type,
            notification.user_id,
            notification.title,
            notification.related_entity_type,
            notification.related_entity_id
        );
        Ok(())
    }
}

/// Persists notifications so clients can fetch them later.
#[derive(Clone)]
pub struct PgNotifier {
    pool: PgPool,
}

impl PgNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationSink for PgNotifier {
    async fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        notification::insert_notification(&self.pool, notification).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    use crate::database::models::{NotificationType, RelatedEntity};

    struct FlakySink {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl NotificationSink for FlakySink {
        async fn notify(&self, _notification: &Notification) -> anyhow::Result<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt == 0 {
                anyhow::bail!("mail relay unavailable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn a_failed_delivery_does_not_stop_the_rest() {
        let flaky = Arc::new(FlakySink {
            attempts: AtomicUsize::new(0),
        });
        let sink: Arc<dyn NotificationSink> = flaky.clone();
        let room = Uuid::new_v4();
        let batch = vec![
            Notification::new(
                Uuid::new_v4(),
                NotificationType::RoomJoined,
                "Someone joined",
                "A player joined your room",
                (RelatedEntity::IndividualRoom, room),
            ),
            Notification::new(
                Uuid::new_v4(),
                NotificationType::RoomFull,
                "Room full",
                "Your room is full",
                (RelatedEntity::IndividualRoom, room),
            ),
        ];

        dispatch(&sink, batch).await;

        assert_eq!(flaky.attempts.load(Ordering::SeqCst), 2);
    }
}
