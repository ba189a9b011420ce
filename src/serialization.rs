//! Wire-format plumbing shared by the resource modules: a JSON-object
//! extractor, a field reader that collects every payload error before
//! failing, list pagination, and the 201 response shape.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::schema::{Choice, FieldError, ValidationErrors};
use crate::store::Page;

/// Request body that must be a JSON object.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(AppError::BadRequest("expected a JSON object".into())),
        }
    }
}

/// Path parameters; a malformed segment is a JSON 400 like every other error.
#[derive(Debug)]
pub struct Path<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string, rejected the same way as [`Path`].
#[derive(Debug)]
pub struct Query<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Pulls typed fields out of a payload object.
///
/// Accessors consume the keys they read; `finish` reports whatever is left
/// as unknown, together with every error recorded along the way. In partial
/// mode (PATCH) nothing is required.
pub struct FieldReader {
    object: Map<String, Value>,
    partial: bool,
    errors: ValidationErrors,
}

impl FieldReader {
    fn new(mut object: Map<String, Value>, read_only: &[&str], partial: bool) -> Self {
        let mut errors = ValidationErrors::new();
        for field in read_only {
            if object.remove(*field).is_some() {
                errors.push(FieldError::ReadOnly {
                    field: (*field).to_string(),
                });
            }
        }
        Self {
            object,
            partial,
            errors,
        }
    }

    pub fn create(object: Map<String, Value>, read_only: &[&str]) -> Self {
        Self::new(object, read_only, false)
    }

    pub fn patch(object: Map<String, Value>, read_only: &[&str]) -> Self {
        Self::new(object, read_only, true)
    }

    fn parsed<T>(
        &mut self,
        field: &str,
        value: &Value,
        parse: impl Fn(&str, &Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match parse(field, value) {
            Ok(v) => Some(v),
            Err(e) => {
                self.errors.push(e);
                None
            }
        }
    }

    /// Non-null value that must be present on create.
    pub fn required<T>(
        &mut self,
        field: &str,
        parse: impl Fn(&str, &Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match self.object.remove(field) {
            None => {
                if !self.partial {
                    self.errors.push(FieldError::Required {
                        field: field.into(),
                    });
                }
                None
            }
            Some(Value::Null) => {
                self.errors.push(FieldError::Null {
                    field: field.into(),
                });
                None
            }
            Some(value) => self.parsed(field, &value, parse),
        }
    }

    /// Non-null value that may be omitted; the caller supplies the default.
    pub fn optional<T>(
        &mut self,
        field: &str,
        parse: impl Fn(&str, &Value) -> Result<T, FieldError>,
    ) -> Option<T> {
        match self.object.remove(field) {
            None => None,
            Some(Value::Null) => {
                self.errors.push(FieldError::Null {
                    field: field.into(),
                });
                None
            }
            Some(value) => self.parsed(field, &value, parse),
        }
    }

    /// Nullable column: `None` when absent, `Some(None)` for an explicit null.
    pub fn nullable<T>(
        &mut self,
        field: &str,
        parse: impl Fn(&str, &Value) -> Result<T, FieldError>,
    ) -> Option<Option<T>> {
        match self.object.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => self.parsed(field, &value, parse).map(Some),
        }
    }

    pub fn finish(mut self) -> Result<(), ValidationErrors> {
        let mut unknown: Vec<String> = self.object.keys().cloned().collect();
        unknown.sort();
        for field in unknown {
            self.errors.push(FieldError::Unknown { field });
        }
        self.errors.into_result()
    }
}

fn invalid_type(field: &str, expected: &'static str) -> FieldError {
    FieldError::InvalidType {
        field: field.into(),
        expected,
    }
}

pub fn string(field: &str, value: &Value) -> Result<String, FieldError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_type(field, "a string"))
}

pub fn int(field: &str, value: &Value) -> Result<i32, FieldError> {
    let n = value.as_i64().ok_or_else(|| invalid_type(field, "an integer"))?;
    i32::try_from(n).map_err(|_| FieldError::Invalid {
        field: field.into(),
        reason: format!("{} is out of range", n),
    })
}

pub fn number(field: &str, value: &Value) -> Result<f64, FieldError> {
    value.as_f64().ok_or_else(|| invalid_type(field, "a number"))
}

pub fn boolean(field: &str, value: &Value) -> Result<bool, FieldError> {
    value.as_bool().ok_or_else(|| invalid_type(field, "a boolean"))
}

pub fn uuid_value(field: &str, value: &Value) -> Result<Uuid, FieldError> {
    let s = value.as_str().ok_or_else(|| invalid_type(field, "a UUID string"))?;
    Uuid::parse_str(s).map_err(|_| FieldError::Invalid {
        field: field.into(),
        reason: format!("'{}' is not a valid UUID", s),
    })
}

pub fn uuid_list(field: &str, value: &Value) -> Result<Vec<Uuid>, FieldError> {
    let items = value
        .as_array()
        .ok_or_else(|| invalid_type(field, "an array of UUID strings"))?;
    items.iter().map(|item| uuid_value(field, item)).collect()
}

/// RFC 3339 timestamp, normalized to UTC.
pub fn datetime(field: &str, value: &Value) -> Result<OffsetDateTime, FieldError> {
    let s = value
        .as_str()
        .ok_or_else(|| invalid_type(field, "an RFC 3339 datetime string"))?;
    OffsetDateTime::parse(s, &Rfc3339)
        .map(|dt| dt.to_offset(time::UtcOffset::UTC))
        .map_err(|_| FieldError::Invalid {
            field: field.into(),
            reason: format!("'{}' is not an RFC 3339 datetime", s),
        })
}

/// Code from a closed enumeration; matching is case-sensitive.
pub fn choice<T: Choice>(field: &str, value: &Value) -> Result<T, FieldError> {
    let code = value.as_str().ok_or_else(|| invalid_type(field, "a string"))?;
    T::from_code(code).ok_or_else(|| FieldError::InvalidChoice {
        field: field.into(),
        value: code.into(),
        expected: T::expected(),
    })
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl From<Pagination> for Page {
    fn from(p: Pagination) -> Self {
        Page::new(p.limit, p.offset)
    }
}

/// 201 with a `Location` header pointing at the new resource.
pub fn created<T: Serialize>(
    location: String,
    body: T,
) -> Result<(StatusCode, HeaderMap, Json<T>), AppError> {
    let value = HeaderValue::try_from(location)
        .map_err(|e| AppError::Internal(format!("invalid Location header: {}", e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, value);
    Ok((StatusCode::CREATED, headers, Json(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::QuantityUnit;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn collects_every_error_at_once() {
        let payload = object(json!({
            "id": "x",
            "quantity": "six",
            "quantity_unit": "LB",
            "colour": "red",
        }));
        let mut r = FieldReader::create(payload, &["id", "created_at"]);
        let name = r.required("name", string);
        let quantity = r.required("quantity", int);
        let unit = r.optional("quantity_unit", choice::<QuantityUnit>);
        assert!(name.is_none() && quantity.is_none() && unit.is_none());

        let errors = r.finish().unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.has("id"));
        assert!(errors.has("name"));
        assert!(errors.has("quantity"));
        assert!(errors.has("quantity_unit"));
        assert!(errors.has("colour"));
    }

    #[test]
    fn partial_mode_requires_nothing() {
        let mut r = FieldReader::patch(Map::new(), &["id"]);
        assert!(r.required("name", string).is_none());
        assert!(r.finish().is_ok());
    }

    #[test]
    fn nullable_distinguishes_null_from_absent() {
        let mut r = FieldReader::patch(object(json!({"picture_url": null})), &[]);
        assert_eq!(r.nullable("picture_url", string), Some(None));
        assert_eq!(r.nullable("name", string), None);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn null_rejected_for_non_nullable() {
        let mut r = FieldReader::patch(object(json!({"quantity": null})), &[]);
        assert!(r.optional("quantity", int).is_none());
        let errors = r.finish().unwrap_err();
        assert_eq!(
            errors.iter().next(),
            Some(&FieldError::Null {
                field: "quantity".into()
            })
        );
    }

    #[test]
    fn choice_is_case_sensitive() {
        assert_eq!(choice::<QuantityUnit>("u", &json!("KG")), Ok(QuantityUnit::Kilogram));
        assert!(matches!(
            choice::<QuantityUnit>("u", &json!("kg")),
            Err(FieldError::InvalidChoice { .. })
        ));
    }

    #[test]
    fn datetime_parses_rfc3339_into_utc() {
        let dt = datetime("expiry_date", &json!("2024-03-08T14:00:00+02:00")).unwrap();
        assert_eq!(dt, time::macros::datetime!(2024-03-08 12:00 UTC));
        assert!(datetime("expiry_date", &json!("next week")).is_err());
    }

    #[test]
    fn uuid_list_rejects_bad_entries() {
        let id = Uuid::new_v4();
        assert_eq!(uuid_list("category_ids", &json!([id.to_string()])), Ok(vec![id]));
        assert!(uuid_list("category_ids", &json!(["nope"])).is_err());
        assert!(uuid_list("category_ids", &json!("nope")).is_err());
    }

    #[test]
    fn int_rejects_fractions_and_overflow() {
        assert!(int("age", &json!(1.5)).is_err());
        assert!(int("age", &json!(5_000_000_000_i64)).is_err());
        assert_eq!(int("age", &json!(28)), Ok(28));
    }

    #[test]
    fn pagination_clamps_into_page() {
        let page: Page = Pagination {
            limit: 1000,
            offset: -1,
        }
        .into();
        assert_eq!(page, Page::new(100, 0));
    }
}
