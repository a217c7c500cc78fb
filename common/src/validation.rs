// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NO_FILE: &str = "No file was submitted.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const NAME_MAX_LENGTH: usize = 255;

/// How much of a record a write replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: required fields must be present, absent optional fields take defaults.
    Create,
    /// PUT: required fields must be present, absent optional fields are left alone.
    Replace,
    /// PATCH: only the supplied fields change.
    Partial,
}

impl WriteMode {
    pub fn requires_all(&self) -> bool {
        !matches!(self, WriteMode::Partial)
    }
}

/// Validation failures keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}` so it can be embedded directly
/// in the body of a 400 response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns `value` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Wraps any present value (including JSON `null`) in `Some`.
///
/// Paired with `#[serde(default)]` on an `Option<Option<T>>` field this tells
/// "absent" (`None`) apart from "explicitly null" (`Some(None)`).
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Checks a required, length-limited text field such as a name.
///
/// Leading and trailing whitespace is trimmed before the checks. An explicit
/// `null` is refused in every mode.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<String>>,
    mode: WriteMode,
) -> Option<String> {
    match value.map(|v| v.map(|v| v.trim().to_string())) {
        None => {
            if mode.requires_all() {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(None) => {
            errors.add(field, NULL);
            None
        }
        Some(Some(v)) => check_length(errors, field, v),
    }
}

fn check_length(errors: &mut FieldErrors, field: &str, value: String) -> Option<String> {
    if value.is_empty() {
        errors.add(field, BLANK);
        None
    } else if value.chars().count() > NAME_MAX_LENGTH {
        errors.add(
            field,
            format!("Ensure this field has no more than {NAME_MAX_LENGTH} characters."),
        );
        None
    } else {
        Some(value)
    }
}

/// Unwraps a field that may be omitted but not sent as `null`.
pub fn non_null<T>(errors: &mut FieldErrors, field: &str, value: Option<Option<T>>) -> Option<T> {
    match value {
        Some(None) => {
            errors.add(field, NULL);
            None
        }
        Some(Some(v)) => Some(v),
        None => None,
    }
}

/// Trims an optional free-text field; blank is allowed, `null` is not.
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<String>>,
) -> Option<String> {
    non_null(errors, field, value).map(|v| v.trim().to_string())
}

/// Parses an id sent as form text. Empty text means "no reference".
pub fn parse_optional_id(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    match raw.parse::<i64>() {
        Ok(id) => Some(Some(id)),
        Err(_) => {
            errors.add(field, INVALID_INTEGER);
            None
        }
    }
}

pub fn invalid_reference(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "present")]
        value: Option<Option<i64>>,
    }

    #[test]
    fn test_present_distinguishes_null_from_absent() {
        let absent: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.value, None);
        let null: Payload = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(null.value, Some(None));
        let set: Payload = serde_json::from_str(r#"{"value": 7}"#).unwrap();
        assert_eq!(set.value, Some(Some(7)));
    }

    #[test]
    fn test_required_text_rules() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", None, WriteMode::Partial), None);
        assert!(errors.is_empty());

        assert_eq!(required_text(&mut errors, "name", None, WriteMode::Create), None);
        assert_eq!(errors.get("name"), Some(&[REQUIRED.to_string()][..]));

        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", Some(None), WriteMode::Partial);
        assert_eq!(errors.get("name"), Some(&[NULL.to_string()][..]));

        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", Some(Some("   ".into())), WriteMode::Partial);
        assert_eq!(errors.get("name"), Some(&[BLANK.to_string()][..]));

        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", Some(Some("x".repeat(256))), WriteMode::Create);
        assert!(errors.contains("name"));

        let mut errors = FieldErrors::new();
        let kept = required_text(
            &mut errors,
            "name",
            Some(Some("  Audit 2026 ".into())),
            WriteMode::Create,
        );
        assert_eq!(kept.as_deref(), Some("Audit 2026"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_optional_text_refuses_null() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_text(&mut errors, "scope", None), None);
        assert_eq!(optional_text(&mut errors, "scope", Some(Some(" ".into()))).as_deref(), Some(""));
        assert!(errors.is_empty());
        assert_eq!(optional_text(&mut errors, "scope", Some(None)), None);
        assert_eq!(errors.get("scope"), Some(&[NULL.to_string()][..]));
    }

    #[test]
    fn test_parse_optional_id() {
        let mut errors = FieldErrors::new();
        assert_eq!(parse_optional_id(&mut errors, "task", ""), Some(None));
        assert_eq!(parse_optional_id(&mut errors, "task", " 12 "), Some(Some(12)));
        assert!(errors.is_empty());
        assert_eq!(parse_optional_id(&mut errors, "task", "twelve"), None);
        assert_eq!(errors.get("task"), Some(&[INVALID_INTEGER.to_string()][..]));
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("name", REQUIRED);
        errors.add("status", "\"Done\" is not a valid choice.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"][0], REQUIRED);
        assert_eq!(json["status"][0], "\"Done\" is not a valid choice.");
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "status"]);
    }
}
