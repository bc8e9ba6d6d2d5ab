//! Typed error handling for the CRM core
//!
//! Every backend failure is mapped into one of a small set of categories so
//! that callers can match on the kind of failure instead of inspecting
//! strings.
//!
//! # Error Categories
//!
//! - [`AuthError`]: sign-in, sign-up and federated sign-in failures
//! - [`SubscriptionError`]: a realtime collection feed failed
//! - [`WriteError`]: add/update/delete rejected by the backend
//! - [`ConfigError`]: connection parameters missing or malformed
//! - [`ValidationError`]: a record failed field validation
//!
//! # Example
//!
//! ```rust,ignore
//! use crm::prelude::*;
//!
//! match repos.clients.delete(&id).await {
//!     Ok(()) => {}
//!     Err(CrmError::Write(WriteError::NotFound { id, .. })) => {
//!         println!("client {} was already removed", id);
//!     }
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! ```

use crate::core::collection::Collection;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = CrmError> = std::result::Result<T, E>;

/// The main error type for the CRM core
#[derive(Debug, Error)]
pub enum CrmError {
    /// Authentication failures
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Realtime subscription failures (collection scoped, non-fatal)
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Rejected writes
    #[error(transparent)]
    Write(#[from] WriteError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal errors (poisoned locks and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CrmError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CrmError::Auth(e) => e.error_code(),
            CrmError::Subscription(e) => e.error_code(),
            CrmError::Write(e) => e.error_code(),
            CrmError::Config(_) => "CONFIG_ERROR",
            CrmError::Validation(_) => "VALIDATION_ERROR",
            CrmError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Short message suitable for showing inline in a section
    pub fn user_message(&self) -> String {
        match self {
            CrmError::Auth(e) => e.user_message().to_string(),
            CrmError::Subscription(e) => e.user_message(),
            CrmError::Write(e) => e.user_message().to_string(),
            CrmError::Config(e) => e.to_string(),
            CrmError::Validation(e) => e.to_string(),
            CrmError::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// The collection this error is scoped to, if any
    pub fn collection(&self) -> Option<Collection> {
        match self {
            CrmError::Subscription(e) => Some(e.collection()),
            CrmError::Write(e) => Some(e.collection()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        CrmError::Validation(ValidationError::Serialization {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CrmError {
    fn from(err: serde_yaml::Error) -> Self {
        CrmError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors raised by the authentication gate
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password rejected (wrong password, malformed email, weak password)
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// Federated flow cancelled or the provider returned an error
    #[error("Federated sign-in with {provider} failed: {message}")]
    FederatedSignInFailed { provider: String, message: String },

    /// An operation needed a session and there is none
    #[error("No user is signed in")]
    NotSignedIn,
}

impl AuthError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            AuthError::FederatedSignInFailed { .. } => "FEDERATED_SIGN_IN_FAILED",
            AuthError::NotSignedIn => "NOT_SIGNED_IN",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials { .. } => {
                "Check your email and password. Passwords need at least 6 characters."
            }
            AuthError::FederatedSignInFailed { .. } => {
                "Sign-in with the external provider did not complete."
            }
            AuthError::NotSignedIn => "Please sign in first.",
        }
    }
}

// =============================================================================
// Subscription Errors
// =============================================================================

/// Errors raised by a realtime collection feed
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The backend refused or broke the feed
    #[error("Subscription to {collection} failed: {message}")]
    Failed {
        collection: Collection,
        message: String,
    },

    /// The feed ended
    #[error("Subscription to {collection} was closed")]
    Closed { collection: Collection },
}

impl SubscriptionError {
    pub fn collection(&self) -> Collection {
        match self {
            SubscriptionError::Failed { collection, .. }
            | SubscriptionError::Closed { collection } => *collection,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            SubscriptionError::Failed { .. } => "SUBSCRIPTION_FAILED",
            SubscriptionError::Closed { .. } => "SUBSCRIPTION_CLOSED",
        }
    }

    pub fn user_message(&self) -> String {
        format!("Could not load {} data.", self.collection())
    }
}

// =============================================================================
// Write Errors
// =============================================================================

/// The kind of write that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOperation {
    Add,
    Update,
    Delete,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Add => write!(f, "add"),
            WriteOperation::Update => write!(f, "update"),
            WriteOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Errors raised by add/update/delete
#[derive(Debug, Error)]
pub enum WriteError {
    /// The backend rejected the write (transient or unknown cause)
    #[error("Failed to {operation} in {collection}: {message}")]
    WriteFailed {
        collection: Collection,
        operation: WriteOperation,
        message: String,
    },

    /// Backend security rules denied the write
    #[error("Permission denied to {operation} in {collection}")]
    PermissionDenied {
        collection: Collection,
        operation: WriteOperation,
    },

    /// Update/delete target does not exist
    #[error("Document '{id}' not found in {collection}")]
    NotFound { collection: Collection, id: String },
}

impl WriteError {
    pub fn collection(&self) -> Collection {
        match self {
            WriteError::WriteFailed { collection, .. }
            | WriteError::PermissionDenied { collection, .. }
            | WriteError::NotFound { collection, .. } => *collection,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WriteError::WriteFailed { .. } => "WRITE_FAILED",
            WriteError::PermissionDenied { .. } => "PERMISSION_DENIED",
            WriteError::NotFound { .. } => "NOT_FOUND",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            WriteError::WriteFailed { operation, .. }
            | WriteError::PermissionDenied { operation, .. } => match operation {
                WriteOperation::Add => "Error adding data.",
                WriteOperation::Update => "Error updating data.",
                WriteOperation::Delete => "Error deleting data.",
            },
            WriteError::NotFound { .. } => "The record no longer exists.",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_deref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Missing required field
    #[error("Missing required configuration field '{field}'")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

/// Errors related to record validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more fields failed validation
    #[error("Validation errors: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join(", "))]
    FieldErrors(Vec<FieldValidationError>),

    /// The record could not be (de)serialized
    #[error("Invalid record: {message}")]
    Serialization { message: String },
}

impl ValidationError {
    /// Shorthand for a single failing field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldErrors(vec![FieldValidationError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// Names of the failing fields
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            ValidationError::Serialization { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_is_collection_scoped() {
        let err = CrmError::from(WriteError::NotFound {
            collection: Collection::Payments,
            id: "abc".to_string(),
        });
        assert_eq!(err.collection(), Some(Collection::Payments));
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_auth_error_has_no_collection() {
        let err = CrmError::from(AuthError::InvalidCredentials {
            message: "wrong password".to_string(),
        });
        assert_eq!(err.collection(), None);
        assert!(err.user_message().contains("6 characters"));
    }

    #[test]
    fn test_write_message_depends_on_operation() {
        let add = WriteError::PermissionDenied {
            collection: Collection::Tasks,
            operation: WriteOperation::Add,
        };
        let delete = WriteError::WriteFailed {
            collection: Collection::Tasks,
            operation: WriteOperation::Delete,
            message: "unavailable".to_string(),
        };
        assert_eq!(add.user_message(), "Error adding data.");
        assert_eq!(delete.user_message(), "Error deleting data.");
    }

    #[test]
    fn test_subscription_message_names_collection() {
        let err = SubscriptionError::Failed {
            collection: Collection::Notifications,
            message: "denied".to_string(),
        };
        assert_eq!(err.user_message(), "Could not load notifications data.");
    }

    #[test]
    fn test_config_parse_error_display() {
        let with_file = ConfigError::ParseError {
            file: Some("crm.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        let without = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(
            with_file.to_string(),
            "Failed to parse config file 'crm.yaml': bad indent"
        );
        assert_eq!(without.to_string(), "Failed to parse config: bad indent");
    }

    #[test]
    fn test_validation_field_errors_display() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "is required".to_string(),
            },
            FieldValidationError {
                field: "taxId".to_string(),
                message: "is required".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation errors: name: is required, taxId: is required"
        );
        assert_eq!(err.fields(), vec!["name", "taxId"]);
    }

    #[test]
    fn test_serde_json_error_converts_to_validation() {
        let err: CrmError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
