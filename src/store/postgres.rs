use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{Page, Store, StoreError, StoreResult};
use crate::schema::{
    Category, CategoryChanges, DietaryPreference, FoodItem, FoodItemCategory, FoodItemChanges,
    NewCategory, NewDietaryPreference, NewFoodItem, NewNotification, NewRecipe, NewUser,
    Notification, NotificationChanges, Recipe, RecipeChanges, User, UserChanges,
    UserDietaryPreference, Validate,
};
use crate::{catalog, food_items, notifications, recipes, users};

/// Postgres-backed store; schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Connects and brings the schema up to date. A failed migration is fatal.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;

        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }
}

/// Postgres rejects U+0000 in text parameters, and no stored id contains one.
fn user_key(id: &str) -> StoreResult<&str> {
    if id.contains('\0') {
        return Err(StoreError::not_found("user", id.escape_default()));
    }
    Ok(id)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        new.validate()?;
        users::repo::insert(&self.db, &new).await
    }

    async fn get_user(&self, id: &str) -> StoreResult<User> {
        users::repo::find(&self.db, user_key(id)?).await
    }

    async fn list_users(&self, page: Page) -> StoreResult<Vec<User>> {
        users::repo::list(&self.db, page).await
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> StoreResult<User> {
        changes.validate()?;
        users::repo::update(&self.db, user_key(id)?, &changes).await
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        users::repo::delete(&self.db, user_key(id)?).await
    }

    async fn create_dietary_preference(
        &self,
        new: NewDietaryPreference,
    ) -> StoreResult<DietaryPreference> {
        new.validate()?;
        catalog::repo::insert_preference(&self.db, &new).await
    }

    async fn get_dietary_preference(&self, id: Uuid) -> StoreResult<DietaryPreference> {
        catalog::repo::find_preference(&self.db, id).await
    }

    async fn list_dietary_preferences(&self) -> StoreResult<Vec<DietaryPreference>> {
        catalog::repo::list_preferences(&self.db).await
    }

    async fn delete_dietary_preference(&self, id: Uuid) -> StoreResult<()> {
        catalog::repo::delete_preference(&self.db, id).await
    }

    async fn add_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<UserDietaryPreference> {
        users::repo::add_preference(&self.db, user_id, preference_id).await
    }

    async fn remove_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<()> {
        users::repo::remove_preference(&self.db, user_id, preference_id).await
    }

    async fn list_user_dietary_preferences(
        &self,
        user_id: &str,
    ) -> StoreResult<Vec<DietaryPreference>> {
        users::repo::list_preferences(&self.db, user_id).await
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<Category> {
        new.validate()?;
        catalog::repo::insert_category(&self.db, &new).await
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Category> {
        catalog::repo::find_category(&self.db, id).await
    }

    async fn get_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>> {
        catalog::repo::find_categories(&self.db, ids).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        catalog::repo::list_categories(&self.db).await
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Category> {
        changes.validate()?;
        catalog::repo::update_category(&self.db, id, &changes).await
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        catalog::repo::delete_category(&self.db, id).await
    }

    async fn create_food_item(&self, new: NewFoodItem) -> StoreResult<FoodItem> {
        new.validate()?;
        food_items::repo::insert(&self.db, &new).await
    }

    async fn get_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<FoodItem> {
        food_items::repo::find(&self.db, user_id, id).await
    }

    async fn list_food_items(&self, user_id: &str, page: Page) -> StoreResult<Vec<FoodItem>> {
        food_items::repo::list_by_user(&self.db, user_id, page).await
    }

    async fn update_food_item(
        &self,
        user_id: &str,
        id: Uuid,
        changes: FoodItemChanges,
    ) -> StoreResult<FoodItem> {
        changes.validate()?;
        food_items::repo::update(&self.db, user_id, id, &changes).await
    }

    async fn delete_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        food_items::repo::delete(&self.db, user_id, id).await
    }

    async fn add_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<FoodItemCategory> {
        food_items::repo::add_category(&self.db, user_id, food_item_id, category_id).await
    }

    async fn remove_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<()> {
        food_items::repo::remove_category(&self.db, user_id, food_item_id, category_id).await
    }

    async fn create_recipe(&self, new: NewRecipe) -> StoreResult<Recipe> {
        new.validate()?;
        recipes::repo::insert(&self.db, &new).await
    }

    async fn get_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<Recipe> {
        recipes::repo::find(&self.db, user_id, id).await
    }

    async fn list_recipes(&self, user_id: &str, page: Page) -> StoreResult<Vec<Recipe>> {
        recipes::repo::list_by_user(&self.db, user_id, page).await
    }

    async fn update_recipe(
        &self,
        user_id: &str,
        id: Uuid,
        changes: RecipeChanges,
    ) -> StoreResult<Recipe> {
        changes.validate()?;
        recipes::repo::update(&self.db, user_id, id, &changes).await
    }

    async fn delete_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        recipes::repo::delete(&self.db, user_id, id).await
    }

    async fn create_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        new.validate()?;
        notifications::repo::insert(&self.db, &new).await
    }

    async fn get_notification(&self, user_id: &str, id: Uuid) -> StoreResult<Notification> {
        notifications::repo::find(&self.db, user_id, id).await
    }

    async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
        page: Page,
    ) -> StoreResult<Vec<Notification>> {
        notifications::repo::list_by_user(&self.db, user_id, unread_only, page).await
    }

    async fn update_notification(
        &self,
        user_id: &str,
        id: Uuid,
        changes: NotificationChanges,
    ) -> StoreResult<Notification> {
        changes.validate()?;
        notifications::repo::update(&self.db, user_id, id, &changes).await
    }

    async fn delete_notification(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        notifications::repo::delete(&self.db, user_id, id).await
    }

    async fn clear_all(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            TRUNCATE food_item_categories, user_dietary_preferences, notifications, recipes,
                     food_items, categories, dietary_preferences, users
            CASCADE
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
