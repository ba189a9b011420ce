use sqlx::PgPool;
use uuid::Uuid;

use crate::schema::{
    sort_categories, Category, CategoryChanges, DietaryPreference, NewCategory,
    NewDietaryPreference,
};
use crate::store::{StoreError, StoreResult};

// ---- dietary preferences ----

pub async fn insert_preference(
    db: &PgPool,
    new: &NewDietaryPreference,
) -> StoreResult<DietaryPreference> {
    let pref = sqlx::query_as::<_, DietaryPreference>(
        r#"
        INSERT INTO dietary_preferences (id, preference_name)
        VALUES ($1, $2)
        RETURNING id, preference_name
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.preference_name)
    .fetch_one(db)
    .await?;
    Ok(pref)
}

pub async fn find_preference(db: &PgPool, id: Uuid) -> StoreResult<DietaryPreference> {
    sqlx::query_as::<_, DietaryPreference>(
        r#"SELECT id, preference_name FROM dietary_preferences WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("dietary preference", id))
}

pub async fn list_preferences(db: &PgPool) -> StoreResult<Vec<DietaryPreference>> {
    let rows = sqlx::query_as::<_, DietaryPreference>(
        r#"SELECT id, preference_name FROM dietary_preferences ORDER BY preference_name, id"#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn delete_preference(db: &PgPool, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM dietary_preferences WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("dietary preference", id));
    }
    Ok(())
}

// ---- categories ----

pub async fn insert_category(db: &PgPool, new: &NewCategory) -> StoreResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, category_name, approx_expiry_time)
        VALUES ($1, $2, $3)
        RETURNING id, category_name, approx_expiry_time
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.category_name)
    .bind(new.approx_expiry_time)
    .fetch_one(db)
    .await?;
    Ok(category)
}

pub async fn find_category(db: &PgPool, id: Uuid) -> StoreResult<Category> {
    sqlx::query_as::<_, Category>(
        r#"SELECT id, category_name, approx_expiry_time FROM categories WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("category", id))
}

pub async fn find_categories(db: &PgPool, ids: &[Uuid]) -> StoreResult<Vec<Category>> {
    let mut rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, category_name, approx_expiry_time
          FROM categories
         WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await?;

    if let Some(missing) = ids.iter().find(|id| !rows.iter().any(|c| &c.id == *id)) {
        return Err(StoreError::not_found("category", missing));
    }
    sort_categories(&mut rows);
    Ok(rows)
}

pub async fn list_categories(db: &PgPool) -> StoreResult<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, category_name, approx_expiry_time
          FROM categories
         ORDER BY category_name, id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update_category(
    db: &PgPool,
    id: Uuid,
    changes: &CategoryChanges,
) -> StoreResult<Category> {
    let mut tx = db.begin().await?;

    let mut category = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, category_name, approx_expiry_time
          FROM categories
         WHERE id = $1
         FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("category", id))?;

    changes.apply(&mut category);

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
           SET category_name = $2, approx_expiry_time = $3
         WHERE id = $1
        RETURNING id, category_name, approx_expiry_time
        "#,
    )
    .bind(category.id)
    .bind(&category.category_name)
    .bind(category.approx_expiry_time)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(category)
}

/// Join rows referencing the category cascade; food items stay.
pub async fn delete_category(db: &PgPool, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM categories WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("category", id));
    }
    Ok(())
}
