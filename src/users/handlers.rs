use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{self, UserResponse};
use crate::catalog::dto::DietaryPreferenceResponse;
use crate::error::AppResult;
use crate::serialization::{created, JsonObject, Pagination, Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:user_id",
            post(create_user)
                .get(get_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route(
            "/users/:user_id/dietary-preferences",
            get(list_preferences).post(add_preference),
        )
        .route(
            "/users/:user_id/dietary-preferences/:preference_id",
            delete(remove_preference),
        )
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.store.list_users(p.into()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<UserResponse>)> {
    let new = dto::new_user(user_id, body)?;
    let user = state.store.create_user(new).await?;
    info!(user_id = %user.id, "user created");
    created(format!("/users/{}", user.id), UserResponse::from(user))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.store.get_user(&user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<Json<UserResponse>> {
    let changes = dto::user_changes(body)?;
    let user = state.store.update_user(&user_id, changes).await?;
    info!(%user_id, "user updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    state.store.delete_user(&user_id).await?;
    info!(%user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<DietaryPreferenceResponse>>> {
    state.store.get_user(&user_id).await?;
    let prefs = state.store.list_user_dietary_preferences(&user_id).await?;
    Ok(Json(prefs.into_iter().map(Into::into).collect()))
}

/// Links a catalog preference and answers with the preference itself.
#[instrument(skip(state, body))]
pub async fn add_preference(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<DietaryPreferenceResponse>)> {
    let preference_id = dto::preference_link(body)?;
    state.store.get_user(&user_id).await?;
    let pref = state.store.get_dietary_preference(preference_id).await?;
    state
        .store
        .add_user_dietary_preference(&user_id, preference_id)
        .await?;
    info!(%user_id, %preference_id, "dietary preference added");
    created(
        format!("/users/{}/dietary-preferences/{}", user_id, preference_id),
        DietaryPreferenceResponse::from(pref),
    )
}

#[instrument(skip(state))]
pub async fn remove_preference(
    State(state): State<AppState>,
    Path((user_id, preference_id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.get_user(&user_id).await?;
    state
        .store
        .remove_user_dietary_preference(&user_id, preference_id)
        .await?;
    info!(%user_id, %preference_id, "dietary preference removed");
    Ok(StatusCode::NO_CONTENT)
}
