use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::{NewRecipe, Recipe, RecipeChanges, ValidationErrors};
use crate::serialization::{string, FieldReader};

const READ_ONLY: &[&str] = &["id", "user_id", "created_at"];

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: String,
    pub dish_photo: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Recipe> for RecipeResponse {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            instructions: r.instructions,
            dish_photo: r.dish_photo,
            created_at: r.created_at,
        }
    }
}

pub fn new_recipe(user_id: String, body: Map<String, Value>) -> Result<NewRecipe, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let title = r.required("title", string);
    let description = r.nullable("description", string);
    let instructions = r.required("instructions", string);
    let dish_photo = r.nullable("dish_photo", string);
    r.finish()?;

    Ok(NewRecipe {
        user_id,
        title: title.unwrap_or_default(),
        description: description.flatten(),
        instructions: instructions.unwrap_or_default(),
        dish_photo: dish_photo.flatten(),
    })
}

pub fn recipe_changes(body: Map<String, Value>) -> Result<RecipeChanges, ValidationErrors> {
    let mut r = FieldReader::patch(body, READ_ONLY);
    let changes = RecipeChanges {
        title: r.optional("title", string),
        description: r.nullable("description", string),
        instructions: r.optional("instructions", string),
        dish_photo: r.nullable("dish_photo", string),
    };
    r.finish()?;
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn title_and_instructions_required() {
        let errors = new_recipe("u1".into(), body(json!({"description": "quick"}))).unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("instructions"));
        assert!(!errors.has("description"));
    }

    #[test]
    fn user_id_is_read_only() {
        let errors = recipe_changes(body(json!({"user_id": "someone-else"}))).unwrap_err();
        assert!(errors.has("user_id"));
    }

    #[test]
    fn patch_can_clear_photo() {
        let changes = recipe_changes(body(json!({"dish_photo": null}))).unwrap();
        assert_eq!(changes.dish_photo, Some(None));
        assert_eq!(changes.title, None);
    }
}
