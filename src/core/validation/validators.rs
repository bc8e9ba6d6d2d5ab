//! Reusable field validators
//!
//! Each validator receives the field name and its JSON value. Absent fields
//! arrive as `null`.

use crate::core::error::ValidationError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Boxed validator as stored in a [`RecordValidation`](super::RecordValidation)
pub type Validator = Box<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Validator: field is present and, for strings, not blank
pub fn required() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value {
        Value::Null => Err(format!("'{}' is required", field)),
        Value::String(s) if s.trim().is_empty() => Err(format!("'{}' is required", field)),
        _ => Ok(()),
    }
}

/// Validator: number must be zero or greater
pub fn non_negative() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_f64() {
        Some(num) if num < 0.0 => Err(format!(
            "'{}' must not be negative (value: {})",
            field, num
        )),
        _ => Ok(()),
    }
}

/// Validator: integer must fall within range
pub fn int_range(
    min: i64,
    max: i64,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| match value.as_i64() {
        Some(num) if num < min || num > max => Err(format!(
            "'{}' must be between {} and {} (value: {})",
            field, min, max, num
        )),
        _ => Ok(()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &Value| {
        if let Some(s) = value.as_str() {
            match chrono::NaiveDate::parse_from_str(s, format) {
                Ok(_) => Ok(()),
                Err(_) => Err(format!(
                    "'{}' must use the format {} (value: {})",
                    field, format, s
                )),
            }
        } else {
            Ok(())
        }
    }
}

/// Validator: non-empty strings must look like an email address
pub fn email() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !s.is_empty() && !is_valid_email(s) => {
            Err(format!("'{}' is not a valid email address", field))
        }
        _ => Ok(()),
    }
}

/// Validator: non-empty strings must be an http(s) URL
pub fn url() -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &Value| match value.as_str() {
        Some(s) if !s.is_empty() && !is_valid_url(s) => {
            Err(format!("'{}' is not a valid link", field))
        }
        _ => Ok(()),
    }
}

/// Typed check: an amount must be a finite number when present
///
/// Runs before encoding; JSON has no NaN or infinity and would store `null`.
pub fn finite_amount(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(num) if !num.is_finite() => Err(ValidationError::field(
            field,
            format!("'{}' must be a finite number (value: {})", field, num),
        )),
        _ => Ok(()),
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
    });
    regex.is_match(email)
}

fn is_valid_url(url: &str) -> bool {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid regex"));
    regex.is_match(url)
}
