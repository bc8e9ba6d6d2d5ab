//! Validation of record fields
//!
//! Each record type declares a [`RecordValidation`]: validators that reject
//! bad input. Repositories run it on the encoded field map before anything
//! reaches the backend. Values are never rewritten on the way; a record
//! reads back exactly as it was written.

pub mod validators;

use crate::core::document::Fields;
use crate::core::error::{FieldValidationError, ValidationError};
use serde_json::Value;
use validators::Validator;

/// Validators for one record type
#[derive(Default)]
pub struct RecordValidation {
    validators: Vec<(&'static str, Validator)>,
}

impl RecordValidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator for a field
    pub fn rule<V>(mut self, field: &'static str, validator: V) -> Self
    where
        V: Fn(&str, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push((field, Box::new(validator)));
        self
    }

    /// Validate a complete record
    ///
    /// Absent fields are validated as `null`.
    pub fn check_create(&self, fields: Fields) -> Result<Fields, ValidationError> {
        self.collect_errors(&fields, false)?;
        Ok(fields)
    }

    /// Validate a partial update
    ///
    /// Only fields present in the patch are validated.
    pub fn check_update(&self, fields: Fields) -> Result<Fields, ValidationError> {
        self.collect_errors(&fields, true)?;
        Ok(fields)
    }

    fn collect_errors(&self, fields: &Fields, present_only: bool) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for (field, validator) in &self.validators {
            let value = match fields.get(*field) {
                Some(value) => value,
                None if present_only => continue,
                None => &Value::Null,
            };
            if let Err(message) = validator(field, value) {
                errors.push(FieldValidationError {
                    field: (*field).to_string(),
                    message,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}
