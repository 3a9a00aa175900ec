//! Input validation utilities
//!
//! Every value that crosses a front-end boundary is parsed here exactly once,
//! producing either a typed value or field-level messages.

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::OnceLock};

use crate::models::{GamePatch, NewGame, Price, PriceError};

pub const NAME_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 150;
pub const EMAIL_MAX_CHARS: usize = 120;

pub const MISSING_FIELD: &str = "Missing data for required field.";
pub const NULL_FIELD: &str = "Field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const UNKNOWN_FIELD: &str = "Unknown field.";

/// Field name to messages, serialized as a flat JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Keep the value on success, record the message on failure
    pub fn collect<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }
}

/// Trim a text field and check it is non-empty and within `max_chars`
pub fn check_text(value: &str, max_chars: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("Must not be empty.".to_string());
    }
    if trimmed.chars().count() > max_chars {
        return Err(format!("Longer than maximum length {}.", max_chars));
    }
    Ok(trimmed.to_string())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if length > 50 {
        return Err("Username must be at most 50 characters long".to_string());
    }

    // Login accepts a username or an email, so the two must never look alike
    if username.contains('@') {
        return Err("Username must not contain '@'".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(format!(
            "Email must be at most {} characters long",
            EMAIL_MAX_CHARS
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a contact form submission
pub fn validate_contact(name: &str, email: &str, message: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let name_length = name.trim().chars().count();
    if !(2..=50).contains(&name_length) {
        errors.add("name", "Name must be between 2 and 50 characters long");
    }
    if let Err(e) = validate_email(email.trim()) {
        errors.add("email", e);
    }
    let message_length = message.trim().chars().count();
    if !(10..=200).contains(&message_length) {
        errors.add("message", "Message must be between 10 and 200 characters long");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    body.as_object()
        .ok_or_else(|| FieldErrors::single("_schema", "Invalid input type."))
}

fn text_value(value: &Value, max_chars: usize) -> Result<String, String> {
    match value {
        Value::String(s) => check_text(s, max_chars),
        _ => Err(NOT_A_STRING.to_string()),
    }
}

fn price_value(value: &Value) -> Result<Price, String> {
    let result = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or(PriceError::NotNumeric)
            .and_then(Price::new),
        Value::String(s) => s.parse(),
        _ => Err(PriceError::NotNumeric),
    };
    result.map_err(|e| e.to_string())
}

/// Look up `key`, treating absence as `None` and JSON null as an error
fn optional_field<T>(
    object: &Map<String, Value>,
    key: &str,
    parse: impl FnOnce(&Value) -> Result<T, String>,
    errors: &mut FieldErrors,
) -> Option<T> {
    match object.get(key) {
        None => None,
        Some(Value::Null) => {
            errors.add(key, NULL_FIELD);
            None
        }
        Some(value) => errors.collect(key, parse(value)),
    }
}

fn required_field<T>(
    object: &Map<String, Value>,
    key: &str,
    parse: impl FnOnce(&Value) -> Result<T, String>,
    errors: &mut FieldErrors,
) -> Option<T> {
    if !object.contains_key(key) {
        errors.add(key, MISSING_FIELD);
        return None;
    }
    optional_field(object, key, parse, errors)
}

/// Parse a JSON creation body; unknown keys other than `id` are rejected
pub fn new_game_from_json(body: &Value) -> Result<NewGame, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::new();

    for key in object.keys() {
        if !matches!(key.as_str(), "id" | "name" | "description" | "price") {
            errors.add(key, UNKNOWN_FIELD);
        }
    }

    let name = required_field(object, "name", |v| text_value(v, NAME_MAX_CHARS), &mut errors);
    let description = required_field(
        object,
        "description",
        |v| text_value(v, DESCRIPTION_MAX_CHARS),
        &mut errors,
    );
    let price = required_field(object, "price", price_value, &mut errors);

    match (name, description, price) {
        (Some(name), Some(description), Some(price)) if errors.is_empty() => {
            NewGame::new(name, description, price)
        }
        _ => Err(errors),
    }
}

/// Parse a JSON update body; every field is optional and unknown keys are ignored
pub fn game_patch_from_json(body: &Value) -> Result<GamePatch, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::new();

    let name = optional_field(object, "name", |v| text_value(v, NAME_MAX_CHARS), &mut errors);
    let description = optional_field(
        object,
        "description",
        |v| text_value(v, DESCRIPTION_MAX_CHARS),
        &mut errors,
    );
    let price = optional_field(object, "price", price_value, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    GamePatch::new(name, description, price)
}

fn form_fields(
    name: &str,
    description: &str,
    price: &str,
) -> (Option<String>, Option<String>, Option<Price>, FieldErrors) {
    let mut errors = FieldErrors::new();
    let name = errors.collect("name", check_text(name, NAME_MAX_CHARS));
    let description = errors.collect("description", check_text(description, DESCRIPTION_MAX_CHARS));
    let price = errors.collect("price", price.parse::<Price>().map_err(|e| e.to_string()));
    (name, description, price, errors)
}

/// Parse the create form's string fields
pub fn new_game_from_form(
    name: &str,
    description: &str,
    price: &str,
) -> Result<NewGame, FieldErrors> {
    match form_fields(name, description, price) {
        (Some(name), Some(description), Some(price), errors) if errors.is_empty() => {
            NewGame::new(name, description, price)
        }
        (_, _, _, errors) => Err(errors),
    }
}

/// Parse the edit form; the form always posts every field
pub fn game_patch_from_form(
    name: &str,
    description: &str,
    price: &str,
) -> Result<GamePatch, FieldErrors> {
    match form_fields(name, description, price) {
        (name @ Some(_), description @ Some(_), price @ Some(_), errors) if errors.is_empty() => {
            GamePatch::new(name, description, price)
        }
        (_, _, _, errors) => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_username_length_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_username_cannot_look_like_an_email() {
        assert!(validate_username("victim@example.com").is_err());
        assert!(validate_username("victim.example").is_ok());
    }

    #[test]
    fn test_email_syntax() {
        assert!(validate_email("player@example.com").is_ok());
        assert!(validate_email("player@example").is_err());
        assert!(validate_email("not an email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_new_game_from_json_accepts_valid_body() {
        let game = new_game_from_json(&json!({
            "name": "Chess",
            "description": "Classic",
            "price": 19.99
        }))
        .unwrap();
        assert_eq!(game.name(), "Chess");
        assert_eq!(game.price().as_f64(), 19.99);
    }

    #[test]
    fn test_new_game_from_json_accepts_numeric_string_and_ignores_id() {
        let game = new_game_from_json(&json!({
            "id": 42,
            "name": "Go",
            "description": "Stones",
            "price": "7.50"
        }))
        .unwrap();
        assert_eq!(game.price().as_f64(), 7.5);
    }

    #[test]
    fn test_new_game_from_json_reports_every_field() {
        let errors = new_game_from_json(&json!({
            "name": 3,
            "price": "free",
            "rating": 5
        }))
        .unwrap_err();

        assert_eq!(errors.first("name"), Some(NOT_A_STRING));
        assert_eq!(errors.first("description"), Some(MISSING_FIELD));
        assert_eq!(errors.first("price"), Some("Not a valid number."));
        assert_eq!(errors.first("rating"), Some(UNKNOWN_FIELD));
    }

    #[test]
    fn test_new_game_from_json_rejects_non_object() {
        let errors = new_game_from_json(&json!([1, 2])).unwrap_err();
        assert!(errors.get("_schema").is_some());
    }

    #[test]
    fn test_game_patch_from_json() {
        let patch = game_patch_from_json(&json!({"price": 9.99, "extra": true})).unwrap();
        assert_eq!(patch.price().map(Price::as_f64), Some(9.99));
        assert_eq!(patch.name(), None);

        let errors = game_patch_from_json(&json!({"price": "cheap"})).unwrap_err();
        assert_eq!(errors.first("price"), Some("Not a valid number."));

        let errors = game_patch_from_json(&json!({"name": null})).unwrap_err();
        assert_eq!(errors.first("name"), Some(NULL_FIELD));
    }

    #[test]
    fn test_form_price_failure_is_a_field_error() {
        let errors = new_game_from_form("Chess", "Classic", "abc").unwrap_err();
        assert_eq!(errors.first("price"), Some("Not a valid number."));
        assert!(errors.get("name").is_none());

        let patch = game_patch_from_form("Chess", "Classic", "12").unwrap();
        assert_eq!(patch.price().map(Price::as_f64), Some(12.0));
    }

    #[test]
    fn test_contact_validation() {
        assert!(validate_contact("Ana", "ana@example.com", "Hello there, nice catalog").is_ok());

        let errors = validate_contact("A", "bad", "short").unwrap_err();
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("message").is_some());
    }
}
