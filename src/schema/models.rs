use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::enums::{InputMethod, NotificationType, QuantityUnit};

/// Household member, keyed by the identity provider's UID.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub profile_picture_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DietaryPreference {
    pub id: Uuid,
    pub preference_name: String,
}

/// Join row; (user_id, preference_id) is unique.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserDietaryPreference {
    pub id: Uuid,
    pub user_id: String,
    pub preference_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub category_name: String,
    /// Typical shelf life in days.
    pub approx_expiry_time: i32,
}

/// A food item with its categories expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub picture_url: Option<String>,
    pub quantity: i32,
    pub quantity_unit: QuantityUnit,
    pub expiry_date: OffsetDateTime,
    pub input_method: InputMethod,
    pub categories: Vec<Category>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Join row; (food_item_id, category_id) is unique.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FoodItemCategory {
    pub id: Uuid,
    pub food_item_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub instructions: String,
    pub dish_photo: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
}

/// Sort categories the way every projection lists them.
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.category_name
            .cmp(&b.category_name)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Expiry estimate for an item created at `created_at`: the shortest shelf
/// life among its categories, or `fallback_days` when it has none. `None`
/// when the result falls outside the representable range.
pub fn default_expiry(
    created_at: OffsetDateTime,
    categories: &[Category],
    fallback_days: i64,
) -> Option<OffsetDateTime> {
    let days = categories
        .iter()
        .map(|c| i64::from(c.approx_expiry_time))
        .min()
        .unwrap_or(fallback_days);
    created_at.checked_add(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn category(name: &str, days: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            category_name: name.into(),
            approx_expiry_time: days,
        }
    }

    #[test]
    fn default_expiry_uses_shortest_category() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let cats = vec![category("Dairy", 14), category("Fruits", 7)];
        assert_eq!(default_expiry(now, &cats, 30), Some(datetime!(2024-03-08 12:00 UTC)));
    }

    #[test]
    fn default_expiry_falls_back_without_categories() {
        let now = datetime!(2024-03-01 12:00 UTC);
        assert_eq!(default_expiry(now, &[], 30), Some(datetime!(2024-03-31 12:00 UTC)));
    }

    #[test]
    fn default_expiry_out_of_range_is_none() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let huge = vec![category("Salt", i32::MAX)];
        assert_eq!(default_expiry(now, &huge, 30), None);
    }

    #[test]
    fn categories_sort_by_name() {
        let mut cats = vec![category("Meat", 3), category("Dairy", 14), category("Fruits", 7)];
        sort_categories(&mut cats);
        let names: Vec<_> = cats.iter().map(|c| c.category_name.as_str()).collect();
        assert_eq!(names, ["Dairy", "Fruits", "Meat"]);
    }
}
