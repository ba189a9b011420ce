use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::{Choice, Notification, NotificationType};
use crate::store::StoreError;

#[derive(Debug, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: String,
    pub notification_type: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = StoreError;

    fn try_from(r: NotificationRow) -> Result<Self, Self::Error> {
        let notification_type = NotificationType::from_code(&r.notification_type).ok_or_else(|| {
            StoreError::Corrupt(format!("notifications.type holds '{}'", r.notification_type))
        })?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            notification_type,
            message: r.message,
            is_read: r.is_read,
            created_at: r.created_at,
        })
    }
}
