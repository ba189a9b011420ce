use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::NotificationRow;
use crate::schema::{Choice, NewNotification, Notification, NotificationChanges};
use crate::store::{Page, StoreError, StoreResult};

pub async fn insert(db: &PgPool, new: &NewNotification) -> StoreResult<Notification> {
    let row = sqlx::query_as::<_, NotificationRow>(
        r#"
        INSERT INTO notifications (id, user_id, "type", message, is_read)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, "type" AS notification_type, message, is_read, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.user_id)
    .bind(new.notification_type.code())
    .bind(&new.message)
    .bind(new.is_read)
    .fetch_one(db)
    .await?;
    row.try_into()
}

pub async fn find(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<Notification> {
    sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, user_id, "type" AS notification_type, message, is_read, created_at
          FROM notifications
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("notification", id))?
    .try_into()
}

/// Newest first; `unread_only` drops notifications already read.
pub async fn list_by_user(
    db: &PgPool,
    user_id: &str,
    unread_only: bool,
    page: Page,
) -> StoreResult<Vec<Notification>> {
    let rows = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, user_id, "type" AS notification_type, message, is_read, created_at
          FROM notifications
         WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
         ORDER BY created_at DESC, id
         LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await?;
    rows.into_iter().map(Notification::try_from).collect()
}

pub async fn update(
    db: &PgPool,
    user_id: &str,
    id: Uuid,
    changes: &NotificationChanges,
) -> StoreResult<Notification> {
    let mut tx = db.begin().await?;

    let mut notification: Notification = sqlx::query_as::<_, NotificationRow>(
        r#"
        SELECT id, user_id, "type" AS notification_type, message, is_read, created_at
          FROM notifications
         WHERE id = $1 AND user_id = $2
         FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("notification", id))?
    .try_into()?;

    changes.apply(&mut notification);

    let row = sqlx::query_as::<_, NotificationRow>(
        r#"
        UPDATE notifications
           SET "type" = $2, message = $3, is_read = $4
         WHERE id = $1
        RETURNING id, user_id, "type" AS notification_type, message, is_read, created_at
        "#,
    )
    .bind(notification.id)
    .bind(notification.notification_type.code())
    .bind(&notification.message)
    .bind(notification.is_read)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    row.try_into()
}

pub async fn delete(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM notifications WHERE id = $1 AND user_id = $2"#)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("notification", id));
    }
    Ok(())
}
