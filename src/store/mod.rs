//! Persistence seam. Every write validates its input first and every store
//! enforces the same uniqueness and cascade rules.

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use uuid::Uuid;

use crate::schema::{
    Category, CategoryChanges, DietaryPreference, FoodItem, FoodItemCategory, FoodItemChanges,
    NewCategory, NewDietaryPreference, NewFoodItem, NewNotification, NewRecipe, NewUser,
    Notification, NotificationChanges, Recipe, RecipeChanges, User, UserChanges,
    UserDietaryPreference, ValidationErrors,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let what = match db.kind() {
                ErrorKind::UniqueViolation => Some("duplicate value"),
                ErrorKind::ForeignKeyViolation => Some("missing or referenced row"),
                ErrorKind::CheckViolation => Some("value out of range"),
                ErrorKind::NotNullViolation => Some("missing value"),
                _ => None,
            };
            if let Some(what) = what {
                let constraint = db.constraint().unwrap_or("constraint");
                return Self::Conflict(format!("{} violates {}", what, constraint));
            }
        }
        Self::Database(e)
    }
}

/// Limit/offset window, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(20, 0)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: &str) -> StoreResult<User>;
    async fn list_users(&self, page: Page) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: &str, changes: UserChanges) -> StoreResult<User>;
    /// Cascades to everything the user owns.
    async fn delete_user(&self, id: &str) -> StoreResult<()>;

    // dietary preference catalog
    async fn create_dietary_preference(
        &self,
        new: NewDietaryPreference,
    ) -> StoreResult<DietaryPreference>;
    async fn get_dietary_preference(&self, id: Uuid) -> StoreResult<DietaryPreference>;
    async fn list_dietary_preferences(&self) -> StoreResult<Vec<DietaryPreference>>;
    async fn delete_dietary_preference(&self, id: Uuid) -> StoreResult<()>;

    // user <-> dietary preference
    async fn add_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<UserDietaryPreference>;
    async fn remove_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<()>;
    async fn list_user_dietary_preferences(
        &self,
        user_id: &str,
    ) -> StoreResult<Vec<DietaryPreference>>;

    // category catalog
    async fn create_category(&self, new: NewCategory) -> StoreResult<Category>;
    async fn get_category(&self, id: Uuid) -> StoreResult<Category>;
    /// All of `ids`, sorted by name; the first missing id is NotFound.
    async fn get_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Category>;
    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;

    // food items
    async fn create_food_item(&self, new: NewFoodItem) -> StoreResult<FoodItem>;
    async fn get_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<FoodItem>;
    async fn list_food_items(&self, user_id: &str, page: Page) -> StoreResult<Vec<FoodItem>>;
    async fn update_food_item(
        &self,
        user_id: &str,
        id: Uuid,
        changes: FoodItemChanges,
    ) -> StoreResult<FoodItem>;
    async fn delete_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<()>;
    async fn add_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<FoodItemCategory>;
    async fn remove_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<()>;

    // recipes
    async fn create_recipe(&self, new: NewRecipe) -> StoreResult<Recipe>;
    async fn get_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<Recipe>;
    async fn list_recipes(&self, user_id: &str, page: Page) -> StoreResult<Vec<Recipe>>;
    async fn update_recipe(
        &self,
        user_id: &str,
        id: Uuid,
        changes: RecipeChanges,
    ) -> StoreResult<Recipe>;
    async fn delete_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<()>;

    // notifications
    async fn create_notification(&self, new: NewNotification) -> StoreResult<Notification>;
    async fn get_notification(&self, user_id: &str, id: Uuid) -> StoreResult<Notification>;
    async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
        page: Page,
    ) -> StoreResult<Vec<Notification>>;
    async fn update_notification(
        &self,
        user_id: &str,
        id: Uuid,
        changes: NotificationChanges,
    ) -> StoreResult<Notification>;
    async fn delete_notification(&self, user_id: &str, id: Uuid) -> StoreResult<()>;

    /// Empties every table.
    async fn clear_all(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_clamped() {
        assert_eq!(Page::new(0, -5), Page { limit: 1, offset: 0 });
        assert_eq!(Page::new(500, 10), Page { limit: 100, offset: 10 });
        assert_eq!(Page::default(), Page { limit: 20, offset: 0 });
    }

    #[test]
    fn row_not_found_is_a_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn not_found_message_names_resource() {
        let err = StoreError::not_found("category", "abc");
        assert_eq!(err.to_string(), "category 'abc' not found");
    }
}
