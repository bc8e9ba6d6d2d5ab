//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors carry stable codes
//! - User-facing messages match what each section shows inline
//! - Conversions from serde errors land in the right category
//! - Callers can match on specific failures

use crm::prelude::*;

// =============================================================================
// Error Code Tests
// =============================================================================

mod error_code_tests {
    use super::*;

    #[test]
    fn test_auth_codes() {
        let err = CrmError::Auth(AuthError::InvalidCredentials {
            message: "wrong password".to_string(),
        });
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");

        let err = CrmError::Auth(AuthError::FederatedSignInFailed {
            provider: "google".to_string(),
            message: "popup closed by user".to_string(),
        });
        assert_eq!(err.error_code(), "FEDERATED_SIGN_IN_FAILED");

        assert_eq!(CrmError::Auth(AuthError::NotSignedIn).error_code(), "NOT_SIGNED_IN");
    }

    #[test]
    fn test_subscription_codes() {
        let err = CrmError::Subscription(SubscriptionError::Failed {
            collection: Collection::Payments,
            message: "permission denied".to_string(),
        });
        assert_eq!(err.error_code(), "SUBSCRIPTION_FAILED");

        let err = CrmError::Subscription(SubscriptionError::Closed {
            collection: Collection::Tasks,
        });
        assert_eq!(err.error_code(), "SUBSCRIPTION_CLOSED");
    }

    #[test]
    fn test_write_codes() {
        let failed = CrmError::Write(WriteError::WriteFailed {
            collection: Collection::Clients,
            operation: WriteOperation::Add,
            message: "backend unavailable".to_string(),
        });
        let denied = CrmError::Write(WriteError::PermissionDenied {
            collection: Collection::Clients,
            operation: WriteOperation::Delete,
        });
        let missing = CrmError::Write(WriteError::NotFound {
            collection: Collection::Clients,
            id: "c1".to_string(),
        });

        assert_eq!(failed.error_code(), "WRITE_FAILED");
        assert_eq!(denied.error_code(), "PERMISSION_DENIED");
        assert_eq!(missing.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_config_validation_and_internal_codes() {
        let config = CrmError::Config(ConfigError::MissingField {
            field: "api_key".to_string(),
        });
        let validation = CrmError::Validation(ValidationError::field("name", "is required"));
        let internal = CrmError::Internal("lock poisoned".to_string());

        assert_eq!(config.error_code(), "CONFIG_ERROR");
        assert_eq!(validation.error_code(), "VALIDATION_ERROR");
        assert_eq!(internal.error_code(), "INTERNAL_ERROR");
    }
}

// =============================================================================
// User Message Tests
// =============================================================================

mod user_message_tests {
    use super::*;

    fn write_failed(operation: WriteOperation) -> CrmError {
        CrmError::Write(WriteError::WriteFailed {
            collection: Collection::Payments,
            operation,
            message: "backend unavailable".to_string(),
        })
    }

    #[test]
    fn test_write_messages_follow_operation() {
        assert_eq!(write_failed(WriteOperation::Add).user_message(), "Error adding data.");
        assert_eq!(
            write_failed(WriteOperation::Update).user_message(),
            "Error updating data."
        );
        assert_eq!(
            write_failed(WriteOperation::Delete).user_message(),
            "Error deleting data."
        );
    }

    #[test]
    fn test_permission_denied_reads_like_a_failed_write() {
        let err = CrmError::Write(WriteError::PermissionDenied {
            collection: Collection::Taxes,
            operation: WriteOperation::Update,
        });
        assert_eq!(err.user_message(), "Error updating data.");
    }

    #[test]
    fn test_missing_record_message() {
        let err = CrmError::Write(WriteError::NotFound {
            collection: Collection::Notifications,
            id: "n1".to_string(),
        });
        assert_eq!(err.user_message(), "The record no longer exists.");
    }

    #[test]
    fn test_subscription_message_names_collection() {
        let err = CrmError::Subscription(SubscriptionError::Failed {
            collection: Collection::Clients,
            message: "denied".to_string(),
        });
        assert_eq!(err.user_message(), "Could not load clients data.");
    }

    #[test]
    fn test_internal_message_hides_details() {
        let err = CrmError::Internal("lock poisoned".to_string());
        assert!(!err.user_message().contains("poisoned"));
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_from_auth_error() {
        let err: CrmError = AuthError::NotSignedIn.into();
        assert!(matches!(err, CrmError::Auth(AuthError::NotSignedIn)));
    }

    #[test]
    fn test_from_validation_error() {
        let err: CrmError = ValidationError::field("email", "invalid format").into();
        assert!(matches!(err, CrmError::Validation(_)));
        assert!(err.to_string().contains("email: invalid format"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid").unwrap_err();
        let err: CrmError = json_err.into();
        assert!(matches!(
            err,
            CrmError::Validation(ValidationError::Serialization { .. })
        ));
    }

    #[test]
    fn test_from_serde_yaml_error() {
        let yaml_err = serde_yaml::from_str::<CrmConfig>("backend: [").unwrap_err();
        let err: CrmError = yaml_err.into();
        assert!(matches!(err, CrmError::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_collection_scope() {
        let write = CrmError::Write(WriteError::NotFound {
            collection: Collection::Tasks,
            id: "t1".to_string(),
        });
        assert_eq!(write.collection(), Some(Collection::Tasks));

        let auth = CrmError::Auth(AuthError::NotSignedIn);
        assert_eq!(auth.collection(), None);
    }
}

// =============================================================================
// Error Pattern Matching Tests
// =============================================================================

mod error_matching_tests {
    use super::*;

    fn describe(err: &CrmError) -> &'static str {
        match err {
            CrmError::Auth(AuthError::InvalidCredentials { .. }) => "retry sign-in",
            CrmError::Write(WriteError::NotFound { .. }) => "refresh",
            CrmError::Write(_) => "retry write",
            CrmError::Subscription(_) => "show inline",
            _ => "other",
        }
    }

    #[test]
    fn test_match_specific_failures() {
        let invalid = CrmError::Auth(AuthError::InvalidCredentials {
            message: "x".to_string(),
        });
        let missing = CrmError::Write(WriteError::NotFound {
            collection: Collection::Clients,
            id: "c1".to_string(),
        });
        let closed = CrmError::Subscription(SubscriptionError::Closed {
            collection: Collection::Clients,
        });

        assert_eq!(describe(&invalid), "retry sign-in");
        assert_eq!(describe(&missing), "refresh");
        assert_eq!(describe(&closed), "show inline");
    }

    #[tokio::test]
    async fn test_store_errors_are_typed() {
        let store = InMemoryDocumentStore::new();
        let path = CollectionPath::new("crm-test", "u1", Collection::Clients);

        let err = store
            .update(&path, "missing", Default::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CrmError::Write(WriteError::NotFound { ref id, .. }) if id == "missing"
        ));

        store.deny(&path);
        let err = store.delete(&path, "any").await.unwrap_err();
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_auth_errors_are_typed() {
        let auth = InMemoryAuthProvider::new();

        let err = auth.sign_up("ana@example.com", "12345").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");

        let err = auth
            .sign_in_with_federated(FederatedProvider::Google)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "FEDERATED_SIGN_IN_FAILED");
    }
}
