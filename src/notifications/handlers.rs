use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{self, NotificationQuery, NotificationResponse};
use crate::error::AppResult;
use crate::serialization::{created, JsonObject, Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/users/:user_id/notifications/:id",
            get(get_notification)
                .patch(update_notification)
                .delete(delete_notification),
        )
}

#[instrument(skip(state))]
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(q): Query<NotificationQuery>,
) -> AppResult<Json<Vec<NotificationResponse>>> {
    state.store.get_user(&user_id).await?;
    let notifications = state
        .store
        .list_notifications(&user_id, q.unread, q.page())
        .await?;
    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_notification(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<NotificationResponse>)> {
    let new = dto::new_notification(user_id.clone(), body)?;
    state.store.get_user(&user_id).await?;
    let notification = state.store.create_notification(new).await?;
    info!(%user_id, notification_id = %notification.id, "notification created");
    created(
        format!("/users/{}/notifications/{}", user_id, notification.id),
        NotificationResponse::from(notification),
    )
}

#[instrument(skip(state))]
pub async fn get_notification(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<Json<NotificationResponse>> {
    state.store.get_user(&user_id).await?;
    let notification = state.store.get_notification(&user_id, id).await?;
    Ok(Json(notification.into()))
}

#[instrument(skip(state, body))]
pub async fn update_notification(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    JsonObject(body): JsonObject,
) -> AppResult<Json<NotificationResponse>> {
    let changes = dto::notification_changes(body)?;
    state.store.get_user(&user_id).await?;
    let notification = state
        .store
        .update_notification(&user_id, id, changes)
        .await?;
    info!(%user_id, notification_id = %id, "notification updated");
    Ok(Json(notification.into()))
}

#[instrument(skip(state))]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.get_user(&user_id).await?;
    state.store.delete_notification(&user_id, id).await?;
    info!(%user_id, notification_id = %id, "notification deleted");
    Ok(StatusCode::NO_CONTENT)
}
