use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::{
    Category, CategoryChanges, DietaryPreference, NewCategory, NewDietaryPreference,
    ValidationErrors,
};
use crate::serialization::{int, string, FieldReader};

const READ_ONLY: &[&str] = &["id"];

#[derive(Debug, Serialize)]
pub struct DietaryPreferenceResponse {
    pub id: Uuid,
    pub preference_name: String,
}

impl From<DietaryPreference> for DietaryPreferenceResponse {
    fn from(p: DietaryPreference) -> Self {
        Self {
            id: p.id,
            preference_name: p.preference_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub category_name: String,
    pub approx_expiry_time: i32,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            category_name: c.category_name,
            approx_expiry_time: c.approx_expiry_time,
        }
    }
}

pub fn new_preference(body: Map<String, Value>) -> Result<NewDietaryPreference, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let preference_name = r.required("preference_name", string);
    r.finish()?;
    Ok(NewDietaryPreference {
        preference_name: preference_name.unwrap_or_default(),
    })
}

pub fn new_category(body: Map<String, Value>) -> Result<NewCategory, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let category_name = r.required("category_name", string);
    let approx_expiry_time = r.required("approx_expiry_time", int);
    r.finish()?;
    Ok(NewCategory {
        category_name: category_name.unwrap_or_default(),
        approx_expiry_time: approx_expiry_time.unwrap_or_default(),
    })
}

pub fn category_changes(body: Map<String, Value>) -> Result<CategoryChanges, ValidationErrors> {
    let mut r = FieldReader::patch(body, READ_ONLY);
    let changes = CategoryChanges {
        category_name: r.optional("category_name", string),
        approx_expiry_time: r.optional("approx_expiry_time", int),
    };
    r.finish()?;
    Ok(changes)
}
