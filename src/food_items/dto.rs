use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::catalog::dto::CategoryResponse;
use crate::schema::{FoodItem, FoodItemChanges, InputMethod, QuantityUnit, ValidationErrors};
use crate::serialization::{
    choice, datetime, int, string, uuid_list, uuid_value, FieldReader,
};

pub const READ_ONLY: &[&str] = &["id", "user_id", "categories", "created_at", "updated_at"];

#[derive(Debug, Serialize)]
pub struct FoodItemResponse {
    pub id: Uuid,
    pub name: String,
    pub picture_url: Option<String>,
    pub quantity: i32,
    pub quantity_unit: QuantityUnit,
    #[serde(with = "time::serde::rfc3339")]
    pub expiry_date: OffsetDateTime,
    pub input_method: InputMethod,
    pub categories: Vec<CategoryResponse>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<FoodItem> for FoodItemResponse {
    fn from(item: FoodItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            picture_url: item.picture_url,
            quantity: item.quantity,
            quantity_unit: item.quantity_unit,
            expiry_date: item.expiry_date,
            input_method: item.input_method,
            categories: item.categories.into_iter().map(Into::into).collect(),
            created_at: item.created_at,
        }
    }
}

/// Create payload before the owner and default expiry are filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodItemInput {
    pub name: String,
    pub picture_url: Option<String>,
    pub quantity: i32,
    pub quantity_unit: QuantityUnit,
    pub expiry_date: Option<OffsetDateTime>,
    pub input_method: InputMethod,
    pub category_ids: Vec<Uuid>,
}

pub fn food_item_input(body: Map<String, Value>) -> Result<FoodItemInput, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let name = r.required("name", string);
    let picture_url = r.nullable("picture_url", string);
    let quantity = r.required("quantity", int);
    let quantity_unit = r.optional("quantity_unit", choice::<QuantityUnit>);
    let expiry_date = r.nullable("expiry_date", datetime);
    let input_method = r.optional("input_method", choice::<InputMethod>);
    let category_ids = r.optional("category_ids", uuid_list);
    r.finish()?;

    Ok(FoodItemInput {
        name: name.unwrap_or_default(),
        picture_url: picture_url.flatten(),
        quantity: quantity.unwrap_or_default(),
        quantity_unit: quantity_unit.unwrap_or_default(),
        expiry_date: expiry_date.flatten(),
        input_method: input_method.unwrap_or_default(),
        category_ids: category_ids.unwrap_or_default(),
    })
}

pub fn food_item_changes(body: Map<String, Value>) -> Result<FoodItemChanges, ValidationErrors> {
    let mut r = FieldReader::patch(body, READ_ONLY);
    let changes = FoodItemChanges {
        name: r.optional("name", string),
        picture_url: r.nullable("picture_url", string),
        quantity: r.optional("quantity", int),
        quantity_unit: r.optional("quantity_unit", choice::<QuantityUnit>),
        expiry_date: r.optional("expiry_date", datetime),
        input_method: r.optional("input_method", choice::<InputMethod>),
        category_ids: r.optional("category_ids", uuid_list),
    };
    r.finish()?;
    Ok(changes)
}

/// Body of `POST /users/:user_id/food-items/:id/categories`.
pub fn category_link(body: Map<String, Value>) -> Result<Uuid, ValidationErrors> {
    let mut r = FieldReader::create(body, &["id", "food_item_id"]);
    let category_id = r.required("category_id", uuid_value);
    r.finish()?;
    Ok(category_id.unwrap_or_default())
}
