use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::{NewUser, User, UserChanges, ValidationErrors};
use crate::serialization::{int, number, string, uuid_value, FieldReader};

pub const READ_ONLY: &[&str] = &["id", "created_at", "updated_at"];

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub profile_picture_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            age: u.age,
            weight: u.weight,
            profile_picture_url: u.profile_picture_url,
            created_at: u.created_at,
        }
    }
}

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

/// Body of `POST /users/:user_id`; the id comes from the path.
pub fn new_user(id: String, body: Map<String, Value>) -> Result<NewUser, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let name = r.nullable("name", string);
    let email = r.required("email", string);
    let age = r.nullable("age", int);
    let weight = r.nullable("weight", number);
    let profile_picture_url = r.nullable("profile_picture_url", string);
    r.finish()?;

    Ok(NewUser {
        id,
        name: name.flatten(),
        email: email.map(normalize_email).unwrap_or_default(),
        age: age.flatten(),
        weight: weight.flatten(),
        profile_picture_url: profile_picture_url.flatten(),
    })
}

pub fn user_changes(body: Map<String, Value>) -> Result<UserChanges, ValidationErrors> {
    let mut r = FieldReader::patch(body, READ_ONLY);
    let changes = UserChanges {
        name: r.nullable("name", string),
        email: r.optional("email", string).map(normalize_email),
        age: r.nullable("age", int),
        weight: r.nullable("weight", number),
        profile_picture_url: r.nullable("profile_picture_url", string),
    };
    r.finish()?;
    Ok(changes)
}

/// Body of `POST /users/:user_id/dietary-preferences`.
pub fn preference_link(body: Map<String, Value>) -> Result<Uuid, ValidationErrors> {
    let mut r = FieldReader::create(body, &["id", "user_id"]);
    let preference_id = r.required("preference_id", uuid_value);
    r.finish()?;
    Ok(preference_id.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn projection_has_fixed_fields() {
        let user = User {
            id: "firebase1111".into(),
            name: Some("John Doe".into()),
            email: "john@example.com".into(),
            age: Some(28),
            weight: Some(75.0),
            profile_picture_url: None,
            created_at: time::macros::datetime!(2024-03-01 9:30 UTC),
            updated_at: time::macros::datetime!(2024-03-02 9:30 UTC),
        };
        let v = serde_json::to_value(UserResponse::from(user)).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(v["created_at"], "2024-03-01T09:30:00Z");
        assert!(v.get("updated_at").is_none());
    }

    #[test]
    fn email_is_normalized() {
        let new = new_user("u1".into(), body(json!({"email": "  Jane@Example.COM "}))).unwrap();
        assert_eq!(new.email, "jane@example.com");
        assert_eq!(new.name, None);
    }

    #[test]
    fn id_in_body_is_read_only() {
        let errors =
            new_user("u1".into(), body(json!({"id": "u2", "email": "a@b.co"}))).unwrap_err();
        assert!(errors.has("id"));
    }

    #[test]
    fn missing_email_is_required() {
        let errors = new_user("u1".into(), body(json!({"name": "Jane"}))).unwrap_err();
        assert!(errors.has("email"));
    }

    #[test]
    fn patch_can_clear_age() {
        let changes = user_changes(body(json!({"age": null}))).unwrap();
        assert_eq!(changes.age, Some(None));
        assert_eq!(changes.email, None);
    }
}
