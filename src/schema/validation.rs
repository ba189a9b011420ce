//! Field-level validation errors and the constraint checks shared by
//! creation inputs and change sets.

use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Required field missing from a payload.
    Required { field: String },
    /// `null` sent for a non-nullable field.
    Null { field: String },
    /// Server-assigned field supplied by the client.
    ReadOnly { field: String },
    /// Field not part of the projection.
    Unknown { field: String },
    /// JSON value of the wrong type.
    InvalidType { field: String, expected: &'static str },
    /// Value outside a closed enumeration.
    InvalidChoice { field: String, value: String, expected: String },
    /// Empty or whitespace-only text.
    Blank { field: String },
    /// Text over the column limit.
    TooLong { field: String, max: usize },
    /// Anything else: ranges, formats, duplicates.
    Invalid { field: String, reason: String },
}

impl FieldError {
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::Null { field }
            | Self::ReadOnly { field }
            | Self::Unknown { field }
            | Self::InvalidType { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::Invalid { field, .. } => field,
        }
    }

    /// Message without the field prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Required { .. } => "this field is required".into(),
            Self::Null { .. } => "this field may not be null".into(),
            Self::ReadOnly { .. } => "this field is read-only".into(),
            Self::Unknown { .. } => "unknown field".into(),
            Self::InvalidType { expected, .. } => format!("expected {}", expected),
            Self::InvalidChoice { value, expected, .. } => {
                format!("'{}' is not a valid choice (expected one of {})", value, expected)
            }
            Self::Blank { .. } => "this field may not be blank".into(),
            Self::TooLong { max, .. } => {
                format!("ensure this field has no more than {} characters", max)
            }
            Self::Invalid { reason, .. } => reason.clone(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field(), self.message())
    }
}

impl std::error::Error for FieldError {}

/// Every field error found in one payload or input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// True when some error names `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    /// Messages grouped by field, for response bodies.
    pub fn by_field(&self) -> BTreeMap<String, Vec<String>> {
        let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for e in &self.0 {
            out.entry(e.field().to_string()).or_default().push(e.message());
        }
        out
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(e: FieldError) -> Self {
        Self(vec![e])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Constraint checks run before anything is written.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn check_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        errors.push(FieldError::Blank { field: field.into() });
    } else if value.chars().count() > max {
        errors.push(FieldError::TooLong { field: field.into(), max });
    } else {
        check_no_nul(errors, field, value);
    }
}

/// Postgres text columns cannot hold U+0000.
pub(crate) fn check_no_nul(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.contains('\0') {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: "null characters are not allowed".into(),
        });
    }
}

/// Externally issued identifiers end up in URLs and headers.
pub(crate) fn check_identifier(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max: usize,
) {
    if value.chars().any(char::is_control) {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: "control characters are not allowed".into(),
        });
    } else {
        check_text(errors, field, value, max);
    }
}

pub(crate) fn check_email(errors: &mut ValidationErrors, field: &str, value: &str) {
    check_text(errors, field, value, 254);
    if !value.trim().is_empty() && !is_valid_email(value) {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: "enter a valid email address".into(),
        });
    }
}

pub(crate) fn check_min_i32(errors: &mut ValidationErrors, field: &str, value: i32, min: i32) {
    if value < min {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: format!("ensure this value is greater than or equal to {}", min),
        });
    }
}

pub(crate) fn check_range_i32(
    errors: &mut ValidationErrors,
    field: &str,
    value: i32,
    min: i32,
    max: i32,
) {
    if !(min..=max).contains(&value) {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: format!("ensure this value is between {} and {}", min, max),
        });
    }
}

pub(crate) fn check_non_negative_f64(errors: &mut ValidationErrors, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::Invalid {
            field: field.into(),
            reason: "ensure this value is a finite number greater than or equal to 0".into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("john@example.com"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("john example@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn text_checks_name_the_field() {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", "   ", 10);
        check_text(&mut errors, "title", "abcdefghijk", 10);
        check_text(&mut errors, "ok", "fine", 10);
        assert_eq!(errors.len(), 2);
        assert!(errors.has("name"));
        assert!(errors.has("title"));
        assert!(!errors.has("ok"));
    }

    #[test]
    fn nul_and_control_characters_rejected() {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", "Mi\0lk", 10);
        check_no_nul(&mut errors, "picture_url", "https://img/\0.png");
        check_identifier(&mut errors, "id", "bad\nid", 255);
        check_identifier(&mut errors, "ok", "firebase1111", 255);
        assert_eq!(errors.len(), 3);
        assert!(errors.has("name"));
        assert!(errors.has("picture_url"));
        assert!(errors.has("id"));
        assert!(!errors.has("ok"));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut errors = ValidationErrors::new();
        check_range_i32(&mut errors, "days", 0, 0, 36_500);
        check_range_i32(&mut errors, "days", 36_500, 0, 36_500);
        assert!(errors.is_empty());
        check_range_i32(&mut errors, "days", i32::MAX, 0, 36_500);
        assert!(errors.has("days"));
    }

    #[test]
    fn by_field_groups_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::Required { field: "name".into() });
        errors.push(FieldError::ReadOnly { field: "id".into() });
        let grouped = errors.by_field();
        assert_eq!(grouped["name"], vec!["this field is required".to_string()]);
        assert_eq!(grouped["id"], vec!["this field is read-only".to_string()]);
    }

    #[test]
    fn display_prefixes_field() {
        let err = FieldError::TooLong { field: "name".into(), max: 100 };
        assert_eq!(
            err.to_string(),
            "name: ensure this field has no more than 100 characters"
        );
        let err = FieldError::InvalidChoice {
            field: "quantity_unit".into(),
            value: "LB".into(),
            expected: "KG, UNIT, G".into(),
        };
        assert!(err.to_string().starts_with("quantity_unit: 'LB'"));
    }

    #[test]
    fn negative_and_non_finite_numbers_rejected() {
        let mut errors = ValidationErrors::new();
        check_non_negative_f64(&mut errors, "weight", -1.0);
        check_non_negative_f64(&mut errors, "weight", f64::NAN);
        check_min_i32(&mut errors, "age", -3, 0);
        assert_eq!(errors.len(), 3);
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
