use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{self, CategoryResponse, DietaryPreferenceResponse};
use crate::error::AppResult;
use crate::serialization::{created, JsonObject, Path};
use crate::state::AppState;

pub fn preference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/dietary-preferences",
            get(list_preferences).post(create_preference),
        )
        .route(
            "/dietary-preferences/:id",
            get(get_preference).delete(delete_preference),
        )
}

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

// --- dietary preferences ---

#[instrument(skip(state))]
pub async fn list_preferences(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DietaryPreferenceResponse>>> {
    let prefs = state.store.list_dietary_preferences().await?;
    Ok(Json(prefs.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_preference(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<DietaryPreferenceResponse>)> {
    let new = dto::new_preference(body)?;
    let pref = state.store.create_dietary_preference(new).await?;
    info!(preference_id = %pref.id, name = %pref.preference_name, "dietary preference created");
    created(
        format!("/dietary-preferences/{}", pref.id),
        DietaryPreferenceResponse::from(pref),
    )
}

#[instrument(skip(state))]
pub async fn get_preference(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DietaryPreferenceResponse>> {
    let pref = state.store.get_dietary_preference(id).await?;
    Ok(Json(pref.into()))
}

#[instrument(skip(state))]
pub async fn delete_preference(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_dietary_preference(id).await?;
    info!(preference_id = %id, "dietary preference deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- categories ---

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryResponse>>> {
    let categories = state.store.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<CategoryResponse>)> {
    let new = dto::new_category(body)?;
    let category = state.store.create_category(new).await?;
    info!(category_id = %category.id, name = %category.category_name, "category created");
    created(
        format!("/categories/{}", category.id),
        CategoryResponse::from(category),
    )
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CategoryResponse>> {
    let category = state.store.get_category(id).await?;
    Ok(Json(category.into()))
}

#[instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    JsonObject(body): JsonObject,
) -> AppResult<Json<CategoryResponse>> {
    let changes = dto::category_changes(body)?;
    let category = state.store.update_category(id, changes).await?;
    info!(category_id = %id, "category updated");
    Ok(Json(category.into()))
}

/// Food items keep existing; only their links to this category go away.
#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete_category(id).await?;
    info!(category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
