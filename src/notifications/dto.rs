use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::schema::{
    NewNotification, Notification, NotificationChanges, NotificationType, ValidationErrors,
};
use crate::serialization::{boolean, choice, string, FieldReader};
use crate::store::Page;

const READ_ONLY: &[&str] = &["id", "user_id", "created_at"];

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type,
            message: n.message,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

/// `?unread=true&limit=..&offset=..`. Must stay flat: urlencoded values
/// lose their types under `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NotificationQuery {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page::new(
            self.limit.unwrap_or(default.limit),
            self.offset.unwrap_or(default.offset),
        )
    }
}

pub fn new_notification(
    user_id: String,
    body: Map<String, Value>,
) -> Result<NewNotification, ValidationErrors> {
    let mut r = FieldReader::create(body, READ_ONLY);
    let notification_type = r.optional("type", choice::<NotificationType>);
    let message = r.required("message", string);
    let is_read = r.optional("is_read", boolean);
    r.finish()?;

    Ok(NewNotification {
        user_id,
        notification_type: notification_type.unwrap_or_default(),
        message: message.unwrap_or_default(),
        is_read: is_read.unwrap_or(false),
    })
}

pub fn notification_changes(
    body: Map<String, Value>,
) -> Result<NotificationChanges, ValidationErrors> {
    let mut r = FieldReader::patch(body, READ_ONLY);
    let changes = NotificationChanges {
        notification_type: r.optional("type", choice::<NotificationType>),
        message: r.optional("message", string),
        is_read: r.optional("is_read", boolean),
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
    fn type_is_the_wire_name() {
        let n = Notification {
            id: Uuid::nil(),
            user_id: "u1".into(),
            notification_type: NotificationType::Expiry,
            message: "Milk expires tomorrow".into(),
            is_read: false,
            created_at: time::macros::datetime!(2024-03-01 8:00 UTC),
        };
        let v = serde_json::to_value(NotificationResponse::from(n)).unwrap();
        assert_eq!(v["type"], "EXP");
        assert!(v.get("notification_type").is_none());
    }

    #[test]
    fn defaults_to_unread_system_notice() {
        let new = new_notification("u1".into(), body(json!({"message": "hello"}))).unwrap();
        assert_eq!(new.notification_type, NotificationType::System);
        assert!(!new.is_read);
    }

    #[test]
    fn lowercase_type_is_rejected() {
        let payload = body(json!({"message": "m", "type": "exp"}));
        let errors = new_notification("u1".into(), payload).unwrap_err();
        assert!(errors.has("type"));
    }

    #[test]
    fn query_defaults_to_first_page_of_everything() {
        let q = NotificationQuery {
            unread: false,
            limit: None,
            offset: None,
        };
        assert_eq!(q.page(), Page::default());
    }

    #[test]
    fn patch_marks_read() {
        let changes = notification_changes(body(json!({"is_read": true}))).unwrap();
        assert_eq!(changes.is_read, Some(true));
    }
}
