//! Demo dataset: wipes the store and fills it with a fixed set of users,
//! catalogs and owned rows.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::schema::{
    InputMethod, NewCategory, NewDietaryPreference, NewFoodItem, NewNotification, NewRecipe,
    NewUser, NotificationType, QuantityUnit,
};
use crate::store::{Store, StoreResult};

struct SeedUser {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    age: i32,
    weight: f64,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        id: "firebase1111111111111111111",
        name: "John Doe",
        email: "john@example.com",
        age: 28,
        weight: 75.0,
    },
    SeedUser {
        id: "firebase2222222222222222222",
        name: "Jane Smith",
        email: "jane@example.com",
        age: 32,
        weight: 65.0,
    },
    SeedUser {
        id: "firebase3333333333333333333",
        name: "Mike Wilson",
        email: "mike@example.com",
        age: 45,
        weight: 80.0,
    },
];

const PREFERENCES: &[&str] = &["Vegetarian", "Vegan", "Gluten-free", "Lactose-free", "Keto"];

const PREFERENCES_PER_USER: usize = 2;

const CATEGORIES: &[(&str, i32)] = &[
    ("Fruits", 7),
    ("Vegetables", 5),
    ("Dairy", 14),
    ("Meat", 3),
    ("Grains", 90),
];

// name, quantity, unit, input method, category
const FOODS: &[(&str, i32, QuantityUnit, InputMethod, &str)] = &[
    ("Apples", 6, QuantityUnit::Unit, InputMethod::Manual, "Fruits"),
    ("Milk", 1, QuantityUnit::Unit, InputMethod::Barcode, "Dairy"),
    ("Chicken", 500, QuantityUnit::Gram, InputMethod::Manual, "Meat"),
    ("Rice", 1, QuantityUnit::Kilogram, InputMethod::Manual, "Grains"),
];

const RECIPES: &[(&str, &str, &str)] = &[
    (
        "Chicken Curry",
        "A delicious Indian curry",
        "1. Cook chicken\n2. Add spices\n3. Simmer",
    ),
    (
        "Apple Pie",
        "Classic dessert",
        "1. Make dough\n2. Prepare filling\n3. Bake",
    ),
    (
        "Vegetable Stir Fry",
        "Quick and healthy",
        "1. Chop vegetables\n2. Heat oil\n3. Stir fry",
    ),
];

const NOTIFICATIONS: &[(NotificationType, &str)] = &[
    (NotificationType::Expiry, "Your milk is expiring soon!"),
    (
        NotificationType::Recipe,
        "New recipe suggestion: Try making apple pie!",
    ),
    (NotificationType::System, "Welcome to Santry!"),
];

/// Rows created by [`populate`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub dietary_preferences: usize,
    pub user_dietary_preferences: usize,
    pub categories: usize,
    pub food_items: usize,
    pub recipes: usize,
    pub notifications: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Users: {}", self.users)?;
        writeln!(f, "DietaryPreferences: {}", self.dietary_preferences)?;
        writeln!(f, "UserDietaryPreferences: {}", self.user_dietary_preferences)?;
        writeln!(f, "Categories: {}", self.categories)?;
        writeln!(f, "FoodItems: {}", self.food_items)?;
        writeln!(f, "Recipes: {}", self.recipes)?;
        write!(f, "Notifications: {}", self.notifications)
    }
}

/// Clears every table, then inserts the demo dataset. `rng` picks each
/// user's preferences and each food item's expiry (1 to 30 days out).
pub async fn populate<R>(store: &dyn Store, rng: &mut R) -> StoreResult<SeedSummary>
where
    R: Rng + Send,
{
    let mut summary = SeedSummary::default();

    tracing::info!("clearing existing data");
    store.clear_all().await?;

    for u in USERS {
        store
            .create_user(NewUser {
                id: u.id.into(),
                name: Some(u.name.into()),
                email: u.email.into(),
                age: Some(u.age),
                weight: Some(u.weight),
                profile_picture_url: None,
            })
            .await?;
        summary.users += 1;
    }

    let mut preference_ids: Vec<Uuid> = Vec::with_capacity(PREFERENCES.len());
    for name in PREFERENCES {
        let pref = store
            .create_dietary_preference(NewDietaryPreference {
                preference_name: (*name).into(),
            })
            .await?;
        preference_ids.push(pref.id);
        summary.dietary_preferences += 1;
    }

    for u in USERS {
        let picked: Vec<Uuid> = preference_ids
            .choose_multiple(rng, PREFERENCES_PER_USER)
            .copied()
            .collect();
        for preference_id in picked {
            store.add_user_dietary_preference(u.id, preference_id).await?;
            summary.user_dietary_preferences += 1;
        }
    }

    let mut category_ids: HashMap<&str, Uuid> = HashMap::new();
    for (name, days) in CATEGORIES {
        let category = store
            .create_category(NewCategory {
                category_name: (*name).into(),
                approx_expiry_time: *days,
            })
            .await?;
        category_ids.insert(*name, category.id);
        summary.categories += 1;
    }

    for u in USERS {
        for (name, quantity, unit, method, category) in FOODS {
            let days: i64 = rng.gen_range(1..=30);
            store
                .create_food_item(NewFoodItem {
                    user_id: u.id.into(),
                    name: (*name).into(),
                    picture_url: None,
                    quantity: *quantity,
                    quantity_unit: *unit,
                    expiry_date: OffsetDateTime::now_utc() + Duration::days(days),
                    input_method: *method,
                    category_ids: category_ids.get(category).copied().into_iter().collect(),
                })
                .await?;
            summary.food_items += 1;
        }
    }

    for u in USERS {
        for (title, description, instructions) in RECIPES {
            store
                .create_recipe(NewRecipe {
                    user_id: u.id.into(),
                    title: (*title).into(),
                    description: Some((*description).into()),
                    instructions: (*instructions).into(),
                    dish_photo: None,
                })
                .await?;
            summary.recipes += 1;
        }
    }

    for u in USERS {
        for (kind, message) in NOTIFICATIONS {
            store
                .create_notification(NewNotification {
                    user_id: u.id.into(),
                    notification_type: *kind,
                    message: (*message).into(),
                    is_read: false,
                })
                .await?;
            summary.notifications += 1;
        }
    }

    tracing::info!(
        users = summary.users,
        food_items = summary.food_items,
        recipes = summary.recipes,
        notifications = summary.notifications,
        "seed data created"
    );
    Ok(summary)
}
