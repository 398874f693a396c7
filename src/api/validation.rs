use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Key used for errors that do not belong to a single input field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Field name to messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

/// Take a required text field, recording a message when it is absent or blank.
pub fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

pub fn validate_max_length(value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!(
            "Ensure this field has no more than {max} characters."
        ));
    }
    Ok(())
}

/// Integer in `min..=max`, narrowed to `i32`.
pub fn validate_int_range(value: i64, min: i32, max: i32) -> Result<i32, String> {
    if value < i64::from(min) {
        return Err(format!(
            "Ensure this value is greater than or equal to {min}."
        ));
    }
    if value > i64::from(max) {
        return Err(format!("Ensure this value is less than or equal to {max}."));
    }
    i32::try_from(value).map_err(|_| format!("Ensure this value is less than or equal to {max}."))
}

pub fn validate_username(username: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Invalid regex"));

    validate_max_length(username, 150)?;

    if !re.is_match(username) {
        return Err(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("Invalid regex")
    });

    validate_max_length(email, 254)?;

    if !re.is_match(email) {
        return Err("Enter a valid email address.".to_string());
    }
    Ok(())
}

/// Password strength rules. Returns every failed rule.
pub fn validate_password(password: &str, min_length: usize) -> Vec<String> {
    let mut problems = Vec::new();

    if password.chars().count() < min_length {
        problems.push(format!(
            "This password is too short. It must contain at least {min_length} characters."
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

pub fn validate_slug(slug: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("Invalid regex"));

    validate_max_length(slug, 200)?;

    if !re.is_match(slug) {
        return Err(
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens."
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_hex_color(color: &str) -> Result<(), String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("Invalid regex"));

    if !re.is_match(color) {
        return Err("Enter a color in #RRGGBB format.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("cooking_time", "too small");
        errors.add("cooking_time", "still too small");
        errors.add(NON_FIELD_ERRORS, "bad");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cooking_time": ["too small", "still too small"],
                "non_field_errors": ["bad"],
            })
        );
        assert!(errors.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_required_text() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            required_text(&mut errors, "name", Some("Soup".into())),
            Some("Soup".to_string())
        );
        assert!(required_text(&mut errors, "text", None).is_none());
        assert!(required_text(&mut errors, "name", Some("   ".into())).is_none());

        assert_eq!(errors.get("text"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.get("name"), Some(&[BLANK.to_string()][..]));
    }

    #[test]
    fn test_validate_int_range() {
        assert_eq!(validate_int_range(1, 1, 32767), Ok(1));
        assert_eq!(validate_int_range(32767, 1, 32767), Ok(32767));
        assert!(validate_int_range(0, 1, 32767).is_err());
        assert!(validate_int_range(32768, 1, 32767).is_err());
        assert!(validate_int_range(i64::MAX, 1, 32767).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("chef.anna+test@home-1_x").is_ok());
        assert!(validate_username("Шеф").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(151)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("cook@example.com").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("cook@localhost").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("long enough pw", 8).is_empty());
        assert_eq!(validate_password("short", 8).len(), 1);
        assert_eq!(validate_password("1234567", 8).len(), 2);
        assert_eq!(validate_password("123456789", 8).len(), 1);
    }

    #[test]
    fn test_validate_slug_and_color() {
        assert!(validate_slug("breakfast").is_ok());
        assert!(validate_slug("late-night_snack").is_ok());
        assert!(validate_slug("no spaces").is_err());

        assert!(validate_hex_color("#E26C2D").is_ok());
        assert!(validate_hex_color("E26C2D").is_err());
        assert!(validate_hex_color("#E26C2").is_err());
    }
}
