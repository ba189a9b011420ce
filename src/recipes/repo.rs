use sqlx::PgPool;
use uuid::Uuid;

use crate::schema::{NewRecipe, Recipe, RecipeChanges};
use crate::store::{Page, StoreError, StoreResult};

pub async fn insert(db: &PgPool, new: &NewRecipe) -> StoreResult<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (id, user_id, title, description, instructions, dish_photo)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, description, instructions, dish_photo, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.user_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.instructions)
    .bind(&new.dish_photo)
    .fetch_one(db)
    .await?;
    Ok(recipe)
}

pub async fn find(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<Recipe> {
    sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, description, instructions, dish_photo, created_at
          FROM recipes
         WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("recipe", id))
}

pub async fn list_by_user(db: &PgPool, user_id: &str, page: Page) -> StoreResult<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, description, instructions, dish_photo, created_at
          FROM recipes
         WHERE user_id = $1
         ORDER BY created_at DESC, id
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update(
    db: &PgPool,
    user_id: &str,
    id: Uuid,
    changes: &RecipeChanges,
) -> StoreResult<Recipe> {
    let mut tx = db.begin().await?;

    let mut recipe = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, description, instructions, dish_photo, created_at
          FROM recipes
         WHERE id = $1 AND user_id = $2
         FOR UPDATE
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("recipe", id))?;

    changes.apply(&mut recipe);

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
           SET title = $2, description = $3, instructions = $4, dish_photo = $5
         WHERE id = $1
        RETURNING id, user_id, title, description, instructions, dish_photo, created_at
        "#,
    )
    .bind(recipe.id)
    .bind(&recipe.title)
    .bind(&recipe.description)
    .bind(&recipe.instructions)
    .bind(&recipe.dish_photo)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(recipe)
}

pub async fn delete(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM recipes WHERE id = $1 AND user_id = $2"#)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("recipe", id));
    }
    Ok(())
}
