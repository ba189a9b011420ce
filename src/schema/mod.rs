//! Entity shapes, closed enumerations, constraints and defaults.

mod changes;
mod enums;
mod models;
mod validation;

pub use changes::*;
pub use enums::{Choice, InputMethod, NotificationType, QuantityUnit};
pub use models::{
    default_expiry, sort_categories, Category, DietaryPreference, FoodItem, FoodItemCategory,
    Notification, Recipe, User, UserDietaryPreference,
};
pub use validation::{FieldError, Validate, ValidationErrors};
