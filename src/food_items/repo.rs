use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{FoodItemRow, LinkedCategoryRow};
use crate::schema::{
    sort_categories, Category, Choice, FoodItem, FoodItemCategory, FoodItemChanges, NewFoodItem,
};
use crate::store::{Page, StoreError, StoreResult};

const ITEM_COLUMNS: &str = "id, user_id, name, picture_url, quantity, quantity_unit, \
                            expiry_date, input_method, created_at, updated_at";

/// Categories of every item in `item_ids`, grouped per item and name-sorted.
async fn categories_for<'e>(
    db: impl PgExecutor<'e>,
    item_ids: &[Uuid],
) -> StoreResult<HashMap<Uuid, Vec<Category>>> {
    let rows = sqlx::query_as::<_, LinkedCategoryRow>(
        r#"
        SELECT fic.food_item_id, c.id, c.category_name, c.approx_expiry_time
          FROM food_item_categories fic
          JOIN categories c ON c.id = fic.category_id
         WHERE fic.food_item_id = ANY($1)
        "#,
    )
    .bind(item_ids)
    .fetch_all(db)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for row in rows {
        grouped.entry(row.food_item_id).or_default().push(row.into());
    }
    for categories in grouped.values_mut() {
        sort_categories(categories);
    }
    Ok(grouped)
}

async fn hydrate_one<'e>(db: impl PgExecutor<'e>, row: FoodItemRow) -> StoreResult<FoodItem> {
    let mut grouped = categories_for(db, &[row.id]).await?;
    let categories = grouped.remove(&row.id).unwrap_or_default();
    row.into_item(categories)
}

async fn link_categories(
    tx: &mut Transaction<'_, Postgres>,
    food_item_id: Uuid,
    category_ids: &[Uuid],
) -> StoreResult<()> {
    for category_id in category_ids {
        sqlx::query(
            r#"
            INSERT INTO food_item_categories (id, food_item_id, category_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(food_item_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Item row and its category links are written in one transaction.
pub async fn insert(db: &PgPool, new: &NewFoodItem) -> StoreResult<FoodItem> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, FoodItemRow>(&format!(
        r#"
        INSERT INTO food_items
            (id, user_id, name, picture_url, quantity, quantity_unit, expiry_date, input_method)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&new.user_id)
    .bind(&new.name)
    .bind(&new.picture_url)
    .bind(new.quantity)
    .bind(new.quantity_unit.code())
    .bind(new.expiry_date)
    .bind(new.input_method.code())
    .fetch_one(&mut *tx)
    .await?;

    link_categories(&mut tx, row.id, &new.category_ids).await?;
    let item = hydrate_one(&mut *tx, row).await?;

    tx.commit().await?;
    Ok(item)
}

pub async fn find(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<FoodItem> {
    let row = sqlx::query_as::<_, FoodItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM food_items
         WHERE id = $1 AND user_id = $2
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("food item", id))?;

    hydrate_one(db, row).await
}

pub async fn list_by_user(db: &PgPool, user_id: &str, page: Page) -> StoreResult<Vec<FoodItem>> {
    let rows = sqlx::query_as::<_, FoodItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM food_items
         WHERE user_id = $1
         ORDER BY created_at DESC, id
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(user_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await?;

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut grouped = categories_for(db, &ids).await?;
    rows.into_iter()
        .map(|row| {
            let categories = grouped.remove(&row.id).unwrap_or_default();
            row.into_item(categories)
        })
        .collect()
}

pub async fn update(
    db: &PgPool,
    user_id: &str,
    id: Uuid,
    changes: &FoodItemChanges,
) -> StoreResult<FoodItem> {
    let mut tx = db.begin().await?;

    let row = sqlx::query_as::<_, FoodItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM food_items
         WHERE id = $1 AND user_id = $2
         FOR UPDATE
        "#
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("food item", id))?;

    let mut item = row.into_item(Vec::new())?;
    changes.apply(&mut item);

    let row = sqlx::query_as::<_, FoodItemRow>(&format!(
        r#"
        UPDATE food_items
           SET name = $2, picture_url = $3, quantity = $4, quantity_unit = $5,
               expiry_date = $6, input_method = $7, updated_at = now()
         WHERE id = $1
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(item.id)
    .bind(&item.name)
    .bind(&item.picture_url)
    .bind(item.quantity)
    .bind(item.quantity_unit.code())
    .bind(item.expiry_date)
    .bind(item.input_method.code())
    .fetch_one(&mut *tx)
    .await?;

    if let Some(category_ids) = &changes.category_ids {
        sqlx::query(r#"DELETE FROM food_item_categories WHERE food_item_id = $1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id, category_ids).await?;
    }

    let item = hydrate_one(&mut *tx, row).await?;
    tx.commit().await?;
    Ok(item)
}

pub async fn delete(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM food_items WHERE id = $1 AND user_id = $2"#)
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("food item", id));
    }
    Ok(())
}

async fn require_owned(db: &PgPool, user_id: &str, id: Uuid) -> StoreResult<()> {
    let owned: Option<(Uuid,)> =
        sqlx::query_as(r#"SELECT id FROM food_items WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    owned
        .map(|_| ())
        .ok_or_else(|| StoreError::not_found("food item", id))
}

pub async fn add_category(
    db: &PgPool,
    user_id: &str,
    food_item_id: Uuid,
    category_id: Uuid,
) -> StoreResult<FoodItemCategory> {
    require_owned(db, user_id, food_item_id).await?;
    let link = sqlx::query_as::<_, FoodItemCategory>(
        r#"
        INSERT INTO food_item_categories (id, food_item_id, category_id)
        VALUES ($1, $2, $3)
        RETURNING id, food_item_id, category_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(food_item_id)
    .bind(category_id)
    .fetch_one(db)
    .await?;
    Ok(link)
}

pub async fn remove_category(
    db: &PgPool,
    user_id: &str,
    food_item_id: Uuid,
    category_id: Uuid,
) -> StoreResult<()> {
    require_owned(db, user_id, food_item_id).await?;
    let result = sqlx::query(
        r#"
        DELETE FROM food_item_categories
         WHERE food_item_id = $1 AND category_id = $2
        "#,
    )
    .bind(food_item_id)
    .bind(category_id)
    .execute(db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("food item category", category_id));
    }
    Ok(())
}
