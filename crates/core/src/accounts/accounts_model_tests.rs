//! Tests for account domain models and validation rules.

#[cfg(test)]
mod tests {
    use crate::accounts::{
        is_reserved_username, is_valid_email, Account, AccountUpdate, NewAccount,
    };
    use crate::errors::ValidationError;
    use crate::Error;
    use chrono::NaiveDateTime;

    fn new_account(username: &str, email: &str, secret: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            secret: secret.to_string(),
            name: None,
        }
    }

    fn stored_account() -> Account {
        let ts = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Account {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            secret: "s3cret".to_string(),
            name: Some("Alice".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn validation_error(result: crate::Result<()>) -> ValidationError {
        match result {
            Err(Error::Validation(e)) => e,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    // ==================== Email Tests ====================

    #[test]
    fn test_email_boundaries() {
        assert!(is_valid_email("a@b.c"));
        assert!(is_valid_email("first.last@mail.example.org"));

        assert!(!is_valid_email("no-at-symbol"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("a@b@c.d"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("us er@example.com"));
    }

    // ==================== Reserved Username Tests ====================

    #[test]
    fn test_reserved_username_uses_value_equality() {
        let built = ["ad", "min"].concat();
        assert!(is_reserved_username(&built));
        assert!(!is_reserved_username("administrator"));
        assert!(!is_reserved_username("alice"));
    }

    // ==================== NewAccount Tests ====================

    #[test]
    fn test_new_account_validate_ok() {
        assert!(new_account("alice", "a@b.c", "pw").validate().is_ok());
    }

    #[test]
    fn test_new_account_missing_fields() {
        assert_eq!(
            validation_error(new_account("", "a@b.c", "pw").validate()),
            ValidationError::MissingField("username".to_string())
        );
        assert_eq!(
            validation_error(new_account("alice", "", "pw").validate()),
            ValidationError::MissingField("email".to_string())
        );
        assert_eq!(
            validation_error(new_account("alice", "a@b.c", "").validate()),
            ValidationError::MissingField("secret".to_string())
        );
    }

    #[test]
    fn test_new_account_invalid_email() {
        assert_eq!(
            validation_error(new_account("alice", "no-at-symbol", "pw").validate()),
            ValidationError::InvalidEmail("no-at-symbol".to_string())
        );
    }

    #[test]
    fn test_new_account_reserved_username() {
        assert_eq!(
            validation_error(new_account("admin", "a@b.c", "pw").validate()),
            ValidationError::ReservedUsername("admin".to_string())
        );
    }

    #[test]
    fn test_new_account_normalized_trims_but_keeps_secret() {
        let normalized = NewAccount {
            username: "  alice ".to_string(),
            email: " a@b.c ".to_string(),
            secret: " pw ".to_string(),
            name: Some("   ".to_string()),
        }
        .normalized();

        assert_eq!(normalized.username, "alice");
        assert_eq!(normalized.email, "a@b.c");
        assert_eq!(normalized.secret, " pw ");
        assert_eq!(normalized.name, None);
    }

    #[test]
    fn test_blank_username_after_normalization_is_missing() {
        let normalized = new_account("   ", "a@b.c", "pw").normalized();
        assert_eq!(
            validation_error(normalized.validate()),
            ValidationError::MissingField("username".to_string())
        );
    }

    // ==================== AccountUpdate Tests ====================

    #[test]
    fn test_empty_update_is_valid_and_changes_nothing() {
        let update = AccountUpdate::default();
        assert!(update.is_empty());
        assert!(update.validate().is_ok());

        let mut account = stored_account();
        update.apply_to(&mut account);
        assert_eq!(account, stored_account());
    }

    #[test]
    fn test_update_validates_only_present_fields() {
        let update = AccountUpdate {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validation_error(update.validate()),
            ValidationError::InvalidEmail("broken".to_string())
        );

        let update = AccountUpdate {
            secret: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            validation_error(update.validate()),
            ValidationError::MissingField("secret".to_string())
        );
    }

    #[test]
    fn test_update_apply_merges_present_fields() {
        let mut account = stored_account();
        AccountUpdate {
            email: Some("new@example.com".to_string()),
            name: Some("  ".to_string()),
            ..Default::default()
        }
        .apply_to(&mut account);

        assert_eq!(account.username, "alice");
        assert_eq!(account.email, "new@example.com");
        assert_eq!(account.secret, "s3cret");
        assert_eq!(account.name, None);
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_update_deserializes_missing_fields_as_none() {
        let update: AccountUpdate = serde_json::from_str(r#"{"email":"x@y.z"}"#).unwrap();
        assert_eq!(update.email.as_deref(), Some("x@y.z"));
        assert!(update.username.is_none());
        assert!(update.secret.is_none());
        assert!(update.name.is_none());
    }

    #[test]
    fn test_debug_output_redacts_secret() {
        let rendered = format!("{:?}", stored_account());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("s3cret"));

        let rendered = format!("{:?}", new_account("bob", "b@c.d", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_account_serializes_camel_case() {
        let json = serde_json::to_value(stored_account()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_touch_always_advances_updated_at() {
        let mut account = stored_account();
        let previous = account.updated_at;

        let later = previous + chrono::Duration::seconds(5);
        account.touch(later);
        assert_eq!(account.updated_at, later);

        // A clock that did not move (or went backwards) still advances it.
        account.touch(previous);
        assert_eq!(account.updated_at, later + chrono::Duration::microseconds(1));
        assert_eq!(account.created_at, previous);
    }
}
