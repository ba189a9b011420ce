//! Creation inputs and partial change sets.
//!
//! Change sets use `Option<Option<T>>` for nullable columns: `None` leaves
//! the column alone, `Some(None)` clears it.

use std::collections::HashSet;

use time::OffsetDateTime;
use uuid::Uuid;

use super::enums::{InputMethod, NotificationType, QuantityUnit};
use super::models::{Category, FoodItem, Notification, Recipe, User};
use super::validation::{
    check_email, check_identifier, check_min_i32, check_no_nul, check_non_negative_f64,
    check_range_i32, check_text, FieldError, Validate, ValidationErrors,
};

pub const USER_ID_MAX: usize = 255;
pub const USER_NAME_MAX: usize = 100;
pub const PREFERENCE_NAME_MAX: usize = 50;
pub const CATEGORY_NAME_MAX: usize = 50;
pub const FOOD_NAME_MAX: usize = 100;
pub const RECIPE_TITLE_MAX: usize = 200;
/// Upper bound for any shelf life, in days; keeps expiry estimates in range.
pub const EXPIRY_DAYS_MAX: i32 = 36_500;

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub profile_picture_url: Option<String>,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_identifier(&mut errors, "id", &self.id, USER_ID_MAX);
        if let Some(name) = &self.name {
            check_text(&mut errors, "name", name, USER_NAME_MAX);
        }
        check_email(&mut errors, "email", &self.email);
        if let Some(age) = self.age {
            check_min_i32(&mut errors, "age", age, 0);
        }
        if let Some(weight) = self.weight {
            check_non_negative_f64(&mut errors, "weight", weight);
        }
        if let Some(url) = &self.profile_picture_url {
            check_no_nul(&mut errors, "profile_picture_url", url);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<Option<String>>,
    pub email: Option<String>,
    pub age: Option<Option<i32>>,
    pub weight: Option<Option<f64>>,
    pub profile_picture_url: Option<Option<String>>,
}

impl UserChanges {
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(age) = self.age {
            user.age = age;
        }
        if let Some(weight) = self.weight {
            user.weight = weight;
        }
        if let Some(url) = &self.profile_picture_url {
            user.profile_picture_url = url.clone();
        }
    }
}

impl Validate for UserChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(Some(name)) = &self.name {
            check_text(&mut errors, "name", name, USER_NAME_MAX);
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, "email", email);
        }
        if let Some(Some(age)) = self.age {
            check_min_i32(&mut errors, "age", age, 0);
        }
        if let Some(Some(weight)) = self.weight {
            check_non_negative_f64(&mut errors, "weight", weight);
        }
        if let Some(Some(url)) = &self.profile_picture_url {
            check_no_nul(&mut errors, "profile_picture_url", url);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDietaryPreference {
    pub preference_name: String,
}

impl Validate for NewDietaryPreference {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "preference_name", &self.preference_name, PREFERENCE_NAME_MAX);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub category_name: String,
    pub approx_expiry_time: i32,
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "category_name", &self.category_name, CATEGORY_NAME_MAX);
        check_range_i32(
            &mut errors,
            "approx_expiry_time",
            self.approx_expiry_time,
            0,
            EXPIRY_DAYS_MAX,
        );
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    pub category_name: Option<String>,
    pub approx_expiry_time: Option<i32>,
}

impl CategoryChanges {
    pub fn apply(&self, category: &mut Category) {
        if let Some(name) = &self.category_name {
            category.category_name = name.clone();
        }
        if let Some(days) = self.approx_expiry_time {
            category.approx_expiry_time = days;
        }
    }
}

impl Validate for CategoryChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.category_name {
            check_text(&mut errors, "category_name", name, CATEGORY_NAME_MAX);
        }
        if let Some(days) = self.approx_expiry_time {
            check_range_i32(&mut errors, "approx_expiry_time", days, 0, EXPIRY_DAYS_MAX);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFoodItem {
    pub user_id: String,
    pub name: String,
    pub picture_url: Option<String>,
    pub quantity: i32,
    pub quantity_unit: QuantityUnit,
    pub expiry_date: OffsetDateTime,
    pub input_method: InputMethod,
    pub category_ids: Vec<Uuid>,
}

impl Validate for NewFoodItem {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &self.name, FOOD_NAME_MAX);
        if let Some(url) = &self.picture_url {
            check_no_nul(&mut errors, "picture_url", url);
        }
        check_min_i32(&mut errors, "quantity", self.quantity, 0);
        check_unique_ids(&mut errors, "category_ids", &self.category_ids);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoodItemChanges {
    pub name: Option<String>,
    pub picture_url: Option<Option<String>>,
    pub quantity: Option<i32>,
    pub quantity_unit: Option<QuantityUnit>,
    pub expiry_date: Option<OffsetDateTime>,
    pub input_method: Option<InputMethod>,
    /// Replaces the whole category set when present.
    pub category_ids: Option<Vec<Uuid>>,
}

impl FoodItemChanges {
    /// Applies scalar columns; category membership is the store's job.
    pub fn apply(&self, item: &mut FoodItem) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(url) = &self.picture_url {
            item.picture_url = url.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = self.quantity_unit {
            item.quantity_unit = unit;
        }
        if let Some(expiry) = self.expiry_date {
            item.expiry_date = expiry;
        }
        if let Some(method) = self.input_method {
            item.input_method = method;
        }
    }
}

impl Validate for FoodItemChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_text(&mut errors, "name", name, FOOD_NAME_MAX);
        }
        if let Some(Some(url)) = &self.picture_url {
            check_no_nul(&mut errors, "picture_url", url);
        }
        if let Some(quantity) = self.quantity {
            check_min_i32(&mut errors, "quantity", quantity, 0);
        }
        if let Some(ids) = &self.category_ids {
            check_unique_ids(&mut errors, "category_ids", ids);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: String,
    pub dish_photo: Option<String>,
}

impl Validate for NewRecipe {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "title", &self.title, RECIPE_TITLE_MAX);
        check_text(&mut errors, "instructions", &self.instructions, usize::MAX);
        if let Some(description) = &self.description {
            check_no_nul(&mut errors, "description", description);
        }
        if let Some(photo) = &self.dish_photo {
            check_no_nul(&mut errors, "dish_photo", photo);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub instructions: Option<String>,
    pub dish_photo: Option<Option<String>>,
}

impl RecipeChanges {
    pub fn apply(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &self.description {
            recipe.description = description.clone();
        }
        if let Some(instructions) = &self.instructions {
            recipe.instructions = instructions.clone();
        }
        if let Some(photo) = &self.dish_photo {
            recipe.dish_photo = photo.clone();
        }
    }
}

impl Validate for RecipeChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            check_text(&mut errors, "title", title, RECIPE_TITLE_MAX);
        }
        if let Some(instructions) = &self.instructions {
            check_text(&mut errors, "instructions", instructions, usize::MAX);
        }
        if let Some(Some(description)) = &self.description {
            check_no_nul(&mut errors, "description", description);
        }
        if let Some(Some(photo)) = &self.dish_photo {
            check_no_nul(&mut errors, "dish_photo", photo);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
}

impl Validate for NewNotification {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "message", &self.message, usize::MAX);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationChanges {
    pub notification_type: Option<NotificationType>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
}

impl NotificationChanges {
    pub fn apply(&self, notification: &mut Notification) {
        if let Some(kind) = self.notification_type {
            notification.notification_type = kind;
        }
        if let Some(message) = &self.message {
            notification.message = message.clone();
        }
        if let Some(is_read) = self.is_read {
            notification.is_read = is_read;
        }
    }
}

impl Validate for NotificationChanges {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(message) = &self.message {
            check_text(&mut errors, "message", message, usize::MAX);
        }
        errors.into_result()
    }
}

fn check_unique_ids(errors: &mut ValidationErrors, field: &str, ids: &[Uuid]) {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            errors.push(FieldError::Invalid {
                field: field.into(),
                reason: format!("duplicate id {}", id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_user() -> NewUser {
        NewUser {
            id: "firebase1111".into(),
            name: Some("John Doe".into()),
            email: "john@example.com".into(),
            age: Some(28),
            weight: Some(75.0),
            profile_picture_url: None,
        }
    }

    fn new_item() -> NewFoodItem {
        NewFoodItem {
            user_id: "firebase1111".into(),
            name: "Apples".into(),
            picture_url: None,
            quantity: 6,
            quantity_unit: QuantityUnit::Unit,
            expiry_date: datetime!(2024-03-08 12:00 UTC),
            input_method: InputMethod::Manual,
            category_ids: vec![],
        }
    }

    #[test]
    fn valid_user_passes() {
        assert!(new_user().validate().is_ok());
    }

    #[test]
    fn user_errors_name_each_field() {
        let user = NewUser {
            id: " ".into(),
            email: "not-an-email".into(),
            age: Some(-1),
            ..new_user()
        };
        let errors = user.validate().unwrap_err();
        assert!(errors.has("id"));
        assert!(errors.has("email"));
        assert!(errors.has("age"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn food_item_rejects_negative_quantity_and_duplicate_categories() {
        let id = Uuid::new_v4();
        let item = NewFoodItem {
            quantity: -2,
            category_ids: vec![id, id],
            ..new_item()
        };
        let errors = item.validate().unwrap_err();
        assert!(errors.has("quantity"));
        assert!(errors.has("category_ids"));
    }

    #[test]
    fn user_id_with_control_characters_rejected() {
        let user = NewUser {
            id: "bad\nid".into(),
            ..new_user()
        };
        let errors = user.validate().unwrap_err();
        assert!(errors.has("id"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn shelf_life_is_capped() {
        let category = NewCategory {
            category_name: "Salt".into(),
            approx_expiry_time: i32::MAX,
        };
        assert!(category.validate().unwrap_err().has("approx_expiry_time"));
        let changes = CategoryChanges {
            approx_expiry_time: Some(EXPIRY_DAYS_MAX + 1),
            ..Default::default()
        };
        assert!(changes.validate().unwrap_err().has("approx_expiry_time"));
        let category = NewCategory {
            approx_expiry_time: EXPIRY_DAYS_MAX,
            ..category
        };
        assert!(category.validate().is_ok());
    }

    #[test]
    fn nul_characters_rejected_in_nullable_text() {
        let item = NewFoodItem {
            picture_url: Some("https://img/\0".into()),
            ..new_item()
        };
        assert!(item.validate().unwrap_err().has("picture_url"));
        let changes = RecipeChanges {
            description: Some(Some("Classic\0dessert".into())),
            ..Default::default()
        };
        assert!(changes.validate().unwrap_err().has("description"));
    }

    #[test]
    fn user_changes_can_clear_nullable_columns() {
        let mut user = User {
            id: "u".into(),
            name: Some("Jane".into()),
            email: "jane@example.com".into(),
            age: Some(32),
            weight: Some(65.0),
            profile_picture_url: Some("https://img/jane.png".into()),
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        };
        let changes = UserChanges {
            name: Some(None),
            age: Some(Some(33)),
            ..Default::default()
        };
        changes.apply(&mut user);
        assert_eq!(user.name, None);
        assert_eq!(user.age, Some(33));
        assert_eq!(user.weight, Some(65.0));
        assert_eq!(user.profile_picture_url.as_deref(), Some("https://img/jane.png"));
    }

    #[test]
    fn empty_change_sets_are_valid() {
        assert!(UserChanges::default().validate().is_ok());
        assert!(FoodItemChanges::default().validate().is_ok());
        assert!(RecipeChanges::default().validate().is_ok());
        assert!(NotificationChanges::default().validate().is_ok());
        assert!(CategoryChanges::default().validate().is_ok());
    }

    #[test]
    fn blank_change_values_rejected() {
        let changes = RecipeChanges {
            title: Some("".into()),
            ..Default::default()
        };
        assert!(changes.validate().unwrap_err().has("title"));
        let changes = NotificationChanges {
            message: Some("  ".into()),
            ..Default::default()
        };
        assert!(changes.validate().unwrap_err().has("message"));
    }
}
