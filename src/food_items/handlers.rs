use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{self, FoodItemResponse};
use super::services;
use crate::catalog::dto::CategoryResponse;
use crate::error::AppResult;
use crate::serialization::{created, JsonObject, Pagination, Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/food-items",
            get(list_food_items).post(create_food_item),
        )
        .route(
            "/users/:user_id/food-items/:id",
            get(get_food_item)
                .patch(update_food_item)
                .delete(delete_food_item),
        )
        .route(
            "/users/:user_id/food-items/:id/categories",
            post(add_category),
        )
        .route(
            "/users/:user_id/food-items/:id/categories/:category_id",
            delete(remove_category),
        )
}

#[instrument(skip(state))]
pub async fn list_food_items(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<FoodItemResponse>>> {
    state.store.get_user(&user_id).await?;
    let items = state.store.list_food_items(&user_id, p.into()).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_food_item(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<FoodItemResponse>)> {
    let input = dto::food_item_input(body)?;
    state.store.get_user(&user_id).await?;
    let item = services::create_food_item(&state, user_id.clone(), input).await?;
    info!(%user_id, food_item_id = %item.id, "food item created");
    created(
        format!("/users/{}/food-items/{}", user_id, item.id),
        FoodItemResponse::from(item),
    )
}

#[instrument(skip(state))]
pub async fn get_food_item(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<Json<FoodItemResponse>> {
    state.store.get_user(&user_id).await?;
    let item = state.store.get_food_item(&user_id, id).await?;
    Ok(Json(item.into()))
}

#[instrument(skip(state, body))]
pub async fn update_food_item(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    JsonObject(body): JsonObject,
) -> AppResult<Json<FoodItemResponse>> {
    let changes = dto::food_item_changes(body)?;
    state.store.get_user(&user_id).await?;
    if let Some(ids) = &changes.category_ids {
        state.store.get_categories(ids).await?;
    }
    let item = state.store.update_food_item(&user_id, id, changes).await?;
    info!(%user_id, food_item_id = %id, "food item updated");
    Ok(Json(item.into()))
}

#[instrument(skip(state))]
pub async fn delete_food_item(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.get_user(&user_id).await?;
    state.store.delete_food_item(&user_id, id).await?;
    info!(%user_id, food_item_id = %id, "food item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Links one more category and answers with that category.
#[instrument(skip(state, body))]
pub async fn add_category(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<CategoryResponse>)> {
    let category_id = dto::category_link(body)?;
    state.store.get_user(&user_id).await?;
    state.store.get_food_item(&user_id, id).await?;
    let category = state.store.get_category(category_id).await?;
    state
        .store
        .add_food_item_category(&user_id, id, category_id)
        .await?;
    info!(%user_id, food_item_id = %id, %category_id, "food item category added");
    created(
        format!("/users/{}/food-items/{}/categories/{}", user_id, id, category_id),
        CategoryResponse::from(category),
    )
}

#[instrument(skip(state))]
pub async fn remove_category(
    State(state): State<AppState>,
    Path((user_id, id, category_id)): Path<(String, Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.get_user(&user_id).await?;
    state
        .store
        .remove_food_item_category(&user_id, id, category_id)
        .await?;
    info!(%user_id, food_item_id = %id, %category_id, "food item category removed");
    Ok(StatusCode::NO_CONTENT)
}
