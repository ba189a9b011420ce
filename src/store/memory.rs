//! In-process store used when no database is configured, and by tests.
//!
//! Constraint names in conflict messages match `migrations/`.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Page, Store, StoreError, StoreResult};
use crate::schema::{
    sort_categories, Category, CategoryChanges, DietaryPreference, FoodItem, FoodItemCategory,
    FoodItemChanges, NewCategory, NewDietaryPreference, NewFoodItem, NewNotification, NewRecipe,
    NewUser, Notification, NotificationChanges, Recipe, RecipeChanges, User, UserChanges,
    UserDietaryPreference, Validate,
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    dietary_preferences: HashMap<Uuid, DietaryPreference>,
    user_dietary_preferences: Vec<UserDietaryPreference>,
    categories: HashMap<Uuid, Category>,
    // stored with `categories` empty; expanded on read
    food_items: HashMap<Uuid, FoodItem>,
    food_item_categories: Vec<FoodItemCategory>,
    recipes: HashMap<Uuid, Recipe>,
    notifications: HashMap<Uuid, Notification>,
}

fn duplicate(constraint: &str) -> StoreError {
    StoreError::Conflict(format!("duplicate value violates {}", constraint))
}

fn missing_reference(constraint: &str) -> StoreError {
    StoreError::Conflict(format!("missing or referenced row violates {}", constraint))
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (OffsetDateTime, Uuid)) {
    items.sort_by(|a, b| {
        let (a_at, a_id) = key(a);
        let (b_at, b_id) = key(b);
        b_at.cmp(&a_at).then_with(|| a_id.cmp(&b_id))
    });
}

fn paginate<T>(items: Vec<T>, page: Page) -> Vec<T> {
    let offset = usize::try_from(page.offset).unwrap_or(0);
    let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

impl Tables {
    fn require_user(&self, user_id: &str, constraint: &str) -> StoreResult<()> {
        if self.users.contains_key(user_id) {
            Ok(())
        } else {
            Err(missing_reference(constraint))
        }
    }

    fn require_categories(&self, ids: &[Uuid]) -> StoreResult<()> {
        if ids.iter().all(|id| self.categories.contains_key(id)) {
            Ok(())
        } else {
            Err(missing_reference("food_item_categories_category_id_fkey"))
        }
    }

    fn hydrate(&self, item: &FoodItem) -> FoodItem {
        let mut categories: Vec<Category> = self
            .food_item_categories
            .iter()
            .filter(|link| link.food_item_id == item.id)
            .filter_map(|link| self.categories.get(&link.category_id).cloned())
            .collect();
        sort_categories(&mut categories);
        FoodItem {
            categories,
            ..item.clone()
        }
    }

    fn owned_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<&FoodItem> {
        self.food_items
            .get(&id)
            .filter(|item| item.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("food item", id))
    }

    fn link_categories(&mut self, food_item_id: Uuid, category_ids: &[Uuid]) {
        for category_id in category_ids {
            self.food_item_categories.push(FoodItemCategory {
                id: Uuid::new_v4(),
                food_item_id,
                category_id: *category_id,
            });
        }
    }

    fn owned_recipe_mut(&mut self, user_id: &str, id: Uuid) -> StoreResult<&mut Recipe> {
        self.recipes
            .get_mut(&id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("recipe", id))
    }

    fn owned_notification_mut(
        &mut self,
        user_id: &str,
        id: Uuid,
    ) -> StoreResult<&mut Notification> {
        self.notifications
            .get_mut(&id)
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| StoreError::not_found("notification", id))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        new.validate()?;
        let mut t = self.tables.write().await;
        if t.users.contains_key(&new.id) {
            return Err(duplicate("users_pkey"));
        }
        if t.users.values().any(|u| u.email == new.email) {
            return Err(duplicate("users_email_key"));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: new.id,
            name: new.name,
            email: new.email,
            age: new.age,
            weight: new.weight,
            profile_picture_url: new.profile_picture_url,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> StoreResult<User> {
        let t = self.tables.read().await;
        t.users
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn list_users(&self, page: Page) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(users, page))
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> StoreResult<User> {
        changes.validate()?;
        let mut t = self.tables.write().await;
        if let Some(email) = &changes.email {
            if t.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(duplicate("users_email_key"));
            }
        }
        let user = t
            .users
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("user", id))?;
        changes.apply(user);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: &str) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.users.remove(id).is_none() {
            return Err(StoreError::not_found("user", id));
        }
        t.user_dietary_preferences.retain(|p| p.user_id != id);
        t.food_items.retain(|_, item| item.user_id != id);
        let Tables {
            food_items,
            food_item_categories,
            ..
        } = &mut *t;
        food_item_categories.retain(|link| food_items.contains_key(&link.food_item_id));
        t.recipes.retain(|_, r| r.user_id != id);
        t.notifications.retain(|_, n| n.user_id != id);
        Ok(())
    }

    async fn create_dietary_preference(
        &self,
        new: NewDietaryPreference,
    ) -> StoreResult<DietaryPreference> {
        new.validate()?;
        let mut t = self.tables.write().await;
        if t
            .dietary_preferences
            .values()
            .any(|p| p.preference_name == new.preference_name)
        {
            return Err(duplicate("dietary_preferences_preference_name_key"));
        }
        let pref = DietaryPreference {
            id: Uuid::new_v4(),
            preference_name: new.preference_name,
        };
        t.dietary_preferences.insert(pref.id, pref.clone());
        Ok(pref)
    }

    async fn get_dietary_preference(&self, id: Uuid) -> StoreResult<DietaryPreference> {
        let t = self.tables.read().await;
        t.dietary_preferences
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("dietary preference", id))
    }

    async fn list_dietary_preferences(&self) -> StoreResult<Vec<DietaryPreference>> {
        let t = self.tables.read().await;
        let mut prefs: Vec<DietaryPreference> = t.dietary_preferences.values().cloned().collect();
        prefs.sort_by(|a, b| {
            a.preference_name
                .cmp(&b.preference_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(prefs)
    }

    async fn delete_dietary_preference(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.dietary_preferences.remove(&id).is_none() {
            return Err(StoreError::not_found("dietary preference", id));
        }
        t.user_dietary_preferences.retain(|p| p.preference_id != id);
        Ok(())
    }

    async fn add_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<UserDietaryPreference> {
        let mut t = self.tables.write().await;
        t.require_user(user_id, "user_dietary_preferences_user_id_fkey")?;
        if !t.dietary_preferences.contains_key(&preference_id) {
            return Err(missing_reference("user_dietary_preferences_preference_id_fkey"));
        }
        if t
            .user_dietary_preferences
            .iter()
            .any(|p| p.user_id == user_id && p.preference_id == preference_id)
        {
            return Err(duplicate("user_dietary_preferences_user_id_preference_id_key"));
        }
        let link = UserDietaryPreference {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            preference_id,
        };
        t.user_dietary_preferences.push(link.clone());
        Ok(link)
    }

    async fn remove_user_dietary_preference(
        &self,
        user_id: &str,
        preference_id: Uuid,
    ) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let before = t.user_dietary_preferences.len();
        t.user_dietary_preferences
            .retain(|p| !(p.user_id == user_id && p.preference_id == preference_id));
        if t.user_dietary_preferences.len() == before {
            return Err(StoreError::not_found("user dietary preference", preference_id));
        }
        Ok(())
    }

    async fn list_user_dietary_preferences(
        &self,
        user_id: &str,
    ) -> StoreResult<Vec<DietaryPreference>> {
        let t = self.tables.read().await;
        let mut prefs: Vec<DietaryPreference> = t
            .user_dietary_preferences
            .iter()
            .filter(|p| p.user_id == user_id)
            .filter_map(|p| t.dietary_preferences.get(&p.preference_id).cloned())
            .collect();
        prefs.sort_by(|a, b| {
            a.preference_name
                .cmp(&b.preference_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(prefs)
    }

    async fn create_category(&self, new: NewCategory) -> StoreResult<Category> {
        new.validate()?;
        let mut t = self.tables.write().await;
        if t
            .categories
            .values()
            .any(|c| c.category_name == new.category_name)
        {
            return Err(duplicate("categories_category_name_key"));
        }
        let category = Category {
            id: Uuid::new_v4(),
            category_name: new.category_name,
            approx_expiry_time: new.approx_expiry_time,
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Category> {
        let t = self.tables.read().await;
        t.categories
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("category", id))
    }

    async fn get_categories(&self, ids: &[Uuid]) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            let category = t
                .categories
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::not_found("category", id))?;
            found.push(category);
        }
        sort_categories(&mut found);
        Ok(found)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        let mut categories: Vec<Category> = t.categories.values().cloned().collect();
        sort_categories(&mut categories);
        Ok(categories)
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> StoreResult<Category> {
        changes.validate()?;
        let mut t = self.tables.write().await;
        if let Some(name) = &changes.category_name {
            if t
                .categories
                .values()
                .any(|c| c.id != id && &c.category_name == name)
            {
                return Err(duplicate("categories_category_name_key"));
            }
        }
        let category = t
            .categories
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("category", id))?;
        changes.apply(category);
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.categories.remove(&id).is_none() {
            return Err(StoreError::not_found("category", id));
        }
        t.food_item_categories.retain(|link| link.category_id != id);
        Ok(())
    }

    async fn create_food_item(&self, new: NewFoodItem) -> StoreResult<FoodItem> {
        new.validate()?;
        let mut t = self.tables.write().await;
        t.require_user(&new.user_id, "food_items_user_id_fkey")?;
        t.require_categories(&new.category_ids)?;
        let now = OffsetDateTime::now_utc();
        let item = FoodItem {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name,
            picture_url: new.picture_url,
            quantity: new.quantity,
            quantity_unit: new.quantity_unit,
            expiry_date: new.expiry_date,
            input_method: new.input_method,
            categories: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        t.food_items.insert(item.id, item.clone());
        t.link_categories(item.id, &new.category_ids);
        Ok(t.hydrate(&item))
    }

    async fn get_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<FoodItem> {
        let t = self.tables.read().await;
        let item = t.owned_food_item(user_id, id)?;
        Ok(t.hydrate(item))
    }

    async fn list_food_items(&self, user_id: &str, page: Page) -> StoreResult<Vec<FoodItem>> {
        let t = self.tables.read().await;
        let mut items: Vec<FoodItem> = t
            .food_items
            .values()
            .filter(|item| item.user_id == user_id)
            .map(|item| t.hydrate(item))
            .collect();
        newest_first(&mut items, |i| (i.created_at, i.id));
        Ok(paginate(items, page))
    }

    async fn update_food_item(
        &self,
        user_id: &str,
        id: Uuid,
        changes: FoodItemChanges,
    ) -> StoreResult<FoodItem> {
        changes.validate()?;
        let mut t = self.tables.write().await;
        t.owned_food_item(user_id, id)?;
        if let Some(category_ids) = &changes.category_ids {
            t.require_categories(category_ids)?;
            t.food_item_categories.retain(|link| link.food_item_id != id);
            t.link_categories(id, category_ids);
        }
        let item = t
            .food_items
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("food item", id))?;
        changes.apply(item);
        item.updated_at = OffsetDateTime::now_utc();
        let item = item.clone();
        Ok(t.hydrate(&item))
    }

    async fn delete_food_item(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.owned_food_item(user_id, id)?;
        t.food_items.remove(&id);
        t.food_item_categories.retain(|link| link.food_item_id != id);
        Ok(())
    }

    async fn add_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<FoodItemCategory> {
        let mut t = self.tables.write().await;
        t.owned_food_item(user_id, food_item_id)?;
        t.require_categories(&[category_id])?;
        if t
            .food_item_categories
            .iter()
            .any(|link| link.food_item_id == food_item_id && link.category_id == category_id)
        {
            return Err(duplicate("food_item_categories_food_item_id_category_id_key"));
        }
        let link = FoodItemCategory {
            id: Uuid::new_v4(),
            food_item_id,
            category_id,
        };
        t.food_item_categories.push(link.clone());
        Ok(link)
    }

    async fn remove_food_item_category(
        &self,
        user_id: &str,
        food_item_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.owned_food_item(user_id, food_item_id)?;
        let before = t.food_item_categories.len();
        t.food_item_categories
            .retain(|link| !(link.food_item_id == food_item_id && link.category_id == category_id));
        if t.food_item_categories.len() == before {
            return Err(StoreError::not_found("food item category", category_id));
        }
        Ok(())
    }

    async fn create_recipe(&self, new: NewRecipe) -> StoreResult<Recipe> {
        new.validate()?;
        let mut t = self.tables.write().await;
        t.require_user(&new.user_id, "recipes_user_id_fkey")?;
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            instructions: new.instructions,
            dish_photo: new.dish_photo,
            created_at: OffsetDateTime::now_utc(),
        };
        t.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn get_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<Recipe> {
        let t = self.tables.read().await;
        t.recipes
            .get(&id)
            .filter(|r| r.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("recipe", id))
    }

    async fn list_recipes(&self, user_id: &str, page: Page) -> StoreResult<Vec<Recipe>> {
        let t = self.tables.read().await;
        let mut recipes: Vec<Recipe> = t
            .recipes
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut recipes, |r| (r.created_at, r.id));
        Ok(paginate(recipes, page))
    }

    async fn update_recipe(
        &self,
        user_id: &str,
        id: Uuid,
        changes: RecipeChanges,
    ) -> StoreResult<Recipe> {
        changes.validate()?;
        let mut t = self.tables.write().await;
        let recipe = t.owned_recipe_mut(user_id, id)?;
        changes.apply(recipe);
        Ok(recipe.clone())
    }

    async fn delete_recipe(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.owned_recipe_mut(user_id, id)?;
        t.recipes.remove(&id);
        Ok(())
    }

    async fn create_notification(&self, new: NewNotification) -> StoreResult<Notification> {
        new.validate()?;
        let mut t = self.tables.write().await;
        t.require_user(&new.user_id, "notifications_user_id_fkey")?;
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            notification_type: new.notification_type,
            message: new.message,
            is_read: new.is_read,
            created_at: OffsetDateTime::now_utc(),
        };
        t.notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn get_notification(&self, user_id: &str, id: Uuid) -> StoreResult<Notification> {
        let t = self.tables.read().await;
        t.notifications
            .get(&id)
            .filter(|n| n.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("notification", id))
    }

    async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
        page: Page,
    ) -> StoreResult<Vec<Notification>> {
        let t = self.tables.read().await;
        let mut notifications: Vec<Notification> = t
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        newest_first(&mut notifications, |n| (n.created_at, n.id));
        Ok(paginate(notifications, page))
    }

    async fn update_notification(
        &self,
        user_id: &str,
        id: Uuid,
        changes: NotificationChanges,
    ) -> StoreResult<Notification> {
        changes.validate()?;
        let mut t = self.tables.write().await;
        let notification = t.owned_notification_mut(user_id, id)?;
        changes.apply(notification);
        Ok(notification.clone())
    }

    async fn delete_notification(&self, user_id: &str, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.owned_notification_mut(user_id, id)?;
        t.notifications.remove(&id);
        Ok(())
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        *t = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InputMethod, NotificationType, QuantityUnit};
    use time::macros::datetime;

    async fn store_with_user(id: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_user(NewUser {
                id: id.into(),
                name: Some("John Doe".into()),
                email: format!("{}@example.com", id),
                age: Some(28),
                weight: Some(75.0),
                profile_picture_url: None,
            })
            .await
            .unwrap();
        store
    }

    fn new_item(user_id: &str, category_ids: Vec<Uuid>) -> NewFoodItem {
        NewFoodItem {
            user_id: user_id.into(),
            name: "Apples".into(),
            picture_url: None,
            quantity: 6,
            quantity_unit: QuantityUnit::Unit,
            expiry_date: datetime!(2030-01-01 0:00 UTC),
            input_method: InputMethod::Manual,
            category_ids,
        }
    }

    async fn category(store: &MemoryStore, name: &str, days: i32) -> Category {
        store
            .create_category(NewCategory {
                category_name: name.into(),
                approx_expiry_time: days,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn duplicate_user_preference_is_a_conflict() {
        let store = store_with_user("u1").await;
        let pref = store
            .create_dietary_preference(NewDietaryPreference {
                preference_name: "Vegan".into(),
            })
            .await
            .unwrap();
        store.add_user_dietary_preference("u1", pref.id).await.unwrap();
        let err = store
            .add_user_dietary_preference("u1", pref.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_user_dietary_preferences("u1").await.unwrap(), vec![pref]);
    }

    #[tokio::test]
    async fn duplicate_food_item_category_is_a_conflict() {
        let store = store_with_user("u1").await;
        let fruits = category(&store, "Fruits", 7).await;
        let item = store.create_food_item(new_item("u1", vec![fruits.id])).await.unwrap();
        let err = store
            .add_food_item_category("u1", item.id, fruits.id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("food_item_categories")));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = store_with_user("u1").await;
        let err = store
            .create_user(NewUser {
                id: "u2".into(),
                name: None,
                email: "u1@example.com".into(),
                age: None,
                weight: None,
                profile_picture_url: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("users_email_key")));
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_owned_rows() {
        let store = store_with_user("u1").await;
        store
            .create_user(NewUser {
                id: "u2".into(),
                name: None,
                email: "u2@example.com".into(),
                age: None,
                weight: None,
                profile_picture_url: None,
            })
            .await
            .unwrap();
        let dairy = category(&store, "Dairy", 14).await;
        let pref = store
            .create_dietary_preference(NewDietaryPreference {
                preference_name: "Keto".into(),
            })
            .await
            .unwrap();
        for user in ["u1", "u2"] {
            store.create_food_item(new_item(user, vec![dairy.id])).await.unwrap();
            store.add_user_dietary_preference(user, pref.id).await.unwrap();
            store
                .create_recipe(NewRecipe {
                    user_id: user.into(),
                    title: "Apple Pie".into(),
                    description: None,
                    instructions: "Bake".into(),
                    dish_photo: None,
                })
                .await
                .unwrap();
            store
                .create_notification(NewNotification {
                    user_id: user.into(),
                    notification_type: NotificationType::System,
                    message: "Welcome".into(),
                    is_read: false,
                })
                .await
                .unwrap();
        }

        store.delete_user("u1").await.unwrap();

        let t = store.tables.read().await;
        assert!(t.food_items.values().all(|i| i.user_id == "u2"));
        assert_eq!(t.food_items.len(), 1);
        assert_eq!(t.food_item_categories.len(), 1);
        assert!(t.recipes.values().all(|r| r.user_id == "u2"));
        assert!(t.notifications.values().all(|n| n.user_id == "u2"));
        assert!(t.user_dietary_preferences.iter().all(|p| p.user_id == "u2"));
        assert_eq!(t.categories.len(), 1);
        assert_eq!(t.dietary_preferences.len(), 1);
    }

    #[tokio::test]
    async fn deleting_category_only_removes_links() {
        let store = store_with_user("u1").await;
        let fruits = category(&store, "Fruits", 7).await;
        let dairy = category(&store, "Dairy", 14).await;
        let item = store
            .create_food_item(new_item("u1", vec![fruits.id, dairy.id]))
            .await
            .unwrap();
        store.delete_category(fruits.id).await.unwrap();
        let item = store.get_food_item("u1", item.id).await.unwrap();
        assert_eq!(item.categories, vec![dairy]);
    }

    #[tokio::test]
    async fn owned_rows_are_invisible_to_other_users() {
        let store = store_with_user("u1").await;
        let item = store.create_food_item(new_item("u1", vec![])).await.unwrap();
        let err = store.get_food_item("someone-else", item.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { resource: "food item", .. }));
    }

    #[tokio::test]
    async fn missing_owner_is_a_conflict() {
        let store = MemoryStore::new();
        let err = store.create_food_item(new_item("ghost", vec![])).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(msg) if msg.contains("food_items_user_id_fkey")));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_write() {
        let store = store_with_user("u1").await;
        let mut item = new_item("u1", vec![]);
        item.name = "".into();
        let err = store.create_food_item(item).await.unwrap_err();
        assert!(matches!(&err, StoreError::Validation(e) if e.has("name")));
        assert!(store.list_food_items("u1", Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_category_set() {
        let store = store_with_user("u1").await;
        let fruits = category(&store, "Fruits", 7).await;
        let meat = category(&store, "Meat", 3).await;
        let item = store.create_food_item(new_item("u1", vec![fruits.id])).await.unwrap();
        let updated = store
            .update_food_item(
                "u1",
                item.id,
                FoodItemChanges {
                    quantity: Some(3),
                    category_ids: Some(vec![meat.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 3);
        assert_eq!(updated.categories, vec![meat]);
        assert_eq!(updated.created_at, item.created_at);
    }

    #[tokio::test]
    async fn unread_filter_and_pagination() {
        let store = store_with_user("u1").await;
        for (i, read) in [false, true, false].into_iter().enumerate() {
            store
                .create_notification(NewNotification {
                    user_id: "u1".into(),
                    notification_type: NotificationType::Expiry,
                    message: format!("n{}", i),
                    is_read: read,
                })
                .await
                .unwrap();
        }
        let unread = store
            .list_notifications("u1", true, Page::default())
            .await
            .unwrap();
        assert_eq!(unread.len(), 2);
        assert!(unread.iter().all(|n| !n.is_read));
        let first = store
            .list_notifications("u1", false, Page::new(1, 0))
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
    }

    #[tokio::test]
    async fn clear_all_empties_every_table() {
        let store = store_with_user("u1").await;
        category(&store, "Grains", 90).await;
        store.clear_all().await.unwrap();
        assert!(store.list_users(Page::default()).await.unwrap().is_empty());
        assert!(store.list_categories().await.unwrap().is_empty());
    }
}
