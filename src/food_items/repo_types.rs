use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::{Category, Choice, FoodItem, InputMethod, QuantityUnit};
use crate::store::{StoreError, StoreResult};

/// `food_items` as stored; enum columns are still codes.
#[derive(Debug, FromRow)]
pub struct FoodItemRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub picture_url: Option<String>,
    pub quantity: i32,
    pub quantity_unit: String,
    pub expiry_date: OffsetDateTime,
    pub input_method: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A category joined through `food_item_categories`.
#[derive(Debug, FromRow)]
pub struct LinkedCategoryRow {
    pub food_item_id: Uuid,
    pub id: Uuid,
    pub category_name: String,
    pub approx_expiry_time: i32,
}

impl From<LinkedCategoryRow> for Category {
    fn from(r: LinkedCategoryRow) -> Self {
        Self {
            id: r.id,
            category_name: r.category_name,
            approx_expiry_time: r.approx_expiry_time,
        }
    }
}

fn decode<T: Choice>(column: &str, code: &str) -> StoreResult<T> {
    T::from_code(code)
        .ok_or_else(|| StoreError::Corrupt(format!("food_items.{} holds '{}'", column, code)))
}

impl FoodItemRow {
    pub fn into_item(self, categories: Vec<Category>) -> StoreResult<FoodItem> {
        Ok(FoodItem {
            quantity_unit: decode("quantity_unit", &self.quantity_unit)?,
            input_method: decode("input_method", &self.input_method)?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            picture_url: self.picture_url,
            quantity: self.quantity,
            expiry_date: self.expiry_date,
            categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
