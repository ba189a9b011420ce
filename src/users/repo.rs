use sqlx::PgPool;
use uuid::Uuid;

use crate::schema::{DietaryPreference, NewUser, User, UserChanges, UserDietaryPreference};
use crate::store::{Page, StoreError, StoreResult};

/// Insert a user keyed by its external UID.
pub async fn insert(db: &PgPool, new: &NewUser) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, age, weight, profile_picture_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, email, age, weight, profile_picture_url, created_at, updated_at
        "#,
    )
    .bind(&new.id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(new.age)
    .bind(new.weight)
    .bind(&new.profile_picture_url)
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn find(db: &PgPool, id: &str) -> StoreResult<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, weight, profile_picture_url, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| StoreError::not_found("user", id))
}

pub async fn list(db: &PgPool, page: Page) -> StoreResult<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, weight, profile_picture_url, created_at, updated_at
        FROM users
        ORDER BY created_at DESC, id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Read-modify-write under a row lock.
pub async fn update(db: &PgPool, id: &str, changes: &UserChanges) -> StoreResult<User> {
    let mut tx = db.begin().await?;

    let mut user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, age, weight, profile_picture_url, created_at, updated_at
        FROM users
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| StoreError::not_found("user", id))?;

    changes.apply(&mut user);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
           SET name = $2, email = $3, age = $4, weight = $5,
               profile_picture_url = $6, updated_at = now()
         WHERE id = $1
        RETURNING id, name, email, age, weight, profile_picture_url, created_at, updated_at
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.age)
    .bind(user.weight)
    .bind(&user.profile_picture_url)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(user)
}

/// Owned rows go with the user through ON DELETE CASCADE.
pub async fn delete(db: &PgPool, id: &str) -> StoreResult<()> {
    let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("user", id));
    }
    Ok(())
}

// ---- dietary preferences of a user ----

pub async fn add_preference(
    db: &PgPool,
    user_id: &str,
    preference_id: Uuid,
) -> StoreResult<UserDietaryPreference> {
    let link = sqlx::query_as::<_, UserDietaryPreference>(
        r#"
        INSERT INTO user_dietary_preferences (id, user_id, preference_id)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, preference_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(preference_id)
    .fetch_one(db)
    .await?;
    Ok(link)
}

pub async fn remove_preference(db: &PgPool, user_id: &str, preference_id: Uuid) -> StoreResult<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM user_dietary_preferences
         WHERE user_id = $1 AND preference_id = $2
        "#,
    )
    .bind(user_id)
    .bind(preference_id)
    .execute(db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("user dietary preference", preference_id));
    }
    Ok(())
}

pub async fn list_preferences(db: &PgPool, user_id: &str) -> StoreResult<Vec<DietaryPreference>> {
    let rows = sqlx::query_as::<_, DietaryPreference>(
        r#"
        SELECT dp.id, dp.preference_name
          FROM user_dietary_preferences udp
          JOIN dietary_preferences dp ON dp.id = udp.preference_id
         WHERE udp.user_id = $1
         ORDER BY dp.preference_name, dp.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
