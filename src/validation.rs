//! Form rules checked before any store call.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BoxChanges, ItemChanges, NewBox, NewItem};

pub const MIN_PASSWORD_LEN: usize = 6;

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every failed rule of one form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn require(errors: &mut ValidationErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

pub fn validate_new_box(new_box: &NewBox) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "name", &new_box.name, "Name is required");
    errors.into_result()
}

pub fn validate_box_changes(changes: &BoxChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(name) = &changes.name {
        require(&mut errors, "name", name, "Name is required");
    }
    errors.into_result()
}

pub fn validate_new_item(new_item: &NewItem) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, "name", &new_item.name, "Name is required");
    require(&mut errors, "box_id", &new_item.box_id, "Box is required");
    errors.into_result()
}

pub fn validate_item_changes(changes: &ItemChanges) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if let Some(name) = &changes.name {
        require(&mut errors, "name", name, "Name is required");
    }
    if let Some(box_id) = &changes.box_id {
        require(&mut errors, "box_id", box_id, "Box is required");
    }
    errors.into_result()
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if !RE_EMAIL.is_match(email.trim()) {
        errors.add("email", "Invalid email address");
    }
}

fn check_password(errors: &mut ValidationErrors, field: &'static str, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
}

fn check_new_password(errors: &mut ValidationErrors, password: &str, confirm: &str) {
    check_password(errors, "password", password);
    check_password(errors, "confirm_password", confirm);
    if password != confirm {
        errors.add("confirm_password", "Passwords don't match");
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    check_password(&mut errors, "password", password);
    errors.into_result()
}

pub fn validate_sign_up(email: &str, password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    check_new_password(&mut errors, password, confirm);
    errors.into_result()
}

pub fn validate_reset_request(email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_email(&mut errors, email);
    errors.into_result()
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    check_new_password(&mut errors, password, confirm);
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    #[test]
    fn test_box_name_required() {
        let err = validate_new_box(&NewBox::new("   ", Location::Garage)).unwrap_err();
        assert_eq!(err.for_field("name"), Some("Name is required"));
        assert!(validate_new_box(&NewBox::new("Tools", Location::Garage)).is_ok());
    }

    #[test]
    fn test_item_requires_name_and_box() {
        let err = validate_new_item(&NewItem::new("", "")).unwrap_err();
        assert_eq!(err.fields().len(), 2);
        assert_eq!(err.for_field("box_id"), Some("Box is required"));
    }

    #[test]
    fn test_changes_only_check_present_fields() {
        assert!(validate_box_changes(&BoxChanges::default()).is_ok());
        let changes = ItemChanges {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_item_changes(&changes).is_err());
    }

    #[test]
    fn test_sign_up_rules() {
        assert!(validate_sign_up("a@b.co", "secret1", "secret1").is_ok());

        let err = validate_sign_up("not-an-email", "abc", "abd").unwrap_err();
        assert_eq!(err.for_field("email"), Some("Invalid email address"));
        assert_eq!(
            err.for_field("password"),
            Some("Password must be at least 6 characters")
        );
        assert!(err
            .fields()
            .iter()
            .any(|e| e.field == "confirm_password" && e.message == "Passwords don't match"));
    }

    #[test]
    fn test_login_rules() {
        assert!(validate_login("user@example.com", "123456").is_ok());
        assert!(validate_login("user@example", "123456").is_err());
        assert!(validate_login("user@example.com", "12345").is_err());
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Name is required");
        errors.add("box_id", "Box is required");
        assert_eq!(
            errors.to_string(),
            "name: Name is required; box_id: Box is required"
        );
    }
}
