use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{self, RecipeResponse};
use crate::error::AppResult;
use crate::serialization::{created, JsonObject, Pagination, Path, Query};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id/recipes",
            get(list_recipes).post(create_recipe),
        )
        .route(
            "/users/:user_id/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<RecipeResponse>>> {
    state.store.get_user(&user_id).await?;
    let recipes = state.store.list_recipes(&user_id, p.into()).await?;
    Ok(Json(recipes.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_recipe(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    JsonObject(body): JsonObject,
) -> AppResult<(StatusCode, HeaderMap, Json<RecipeResponse>)> {
    let new = dto::new_recipe(user_id.clone(), body)?;
    state.store.get_user(&user_id).await?;
    let recipe = state.store.create_recipe(new).await?;
    info!(%user_id, recipe_id = %recipe.id, "recipe created");
    created(
        format!("/users/{}/recipes/{}", user_id, recipe.id),
        RecipeResponse::from(recipe),
    )
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<Json<RecipeResponse>> {
    state.store.get_user(&user_id).await?;
    let recipe = state.store.get_recipe(&user_id, id).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state, body))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
    JsonObject(body): JsonObject,
) -> AppResult<Json<RecipeResponse>> {
    let changes = dto::recipe_changes(body)?;
    state.store.get_user(&user_id).await?;
    let recipe = state.store.update_recipe(&user_id, id, changes).await?;
    info!(%user_id, recipe_id = %id, "recipe updated");
    Ok(Json(recipe.into()))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path((user_id, id)): Path<(String, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.get_user(&user_id).await?;
    state.store.delete_recipe(&user_id, id).await?;
    info!(%user_id, recipe_id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
