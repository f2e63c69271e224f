//! Validation helpers for DTOs.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

const ACCOUNT_ID_MAX_LENGTH: usize = 128;

/// Validates that an account ID is a non-empty opaque token of at most 128
/// ASCII letters, digits, `-`, `_` or `.`.
///
/// # Examples
///
/// ```ignore
/// validate_account_id("uid-42")    // Ok
/// validate_account_id("")          // Err - empty
/// validate_account_id("uid 42")    // Err - whitespace
/// ```
pub fn validate_account_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > ACCOUNT_ID_MAX_LENGTH {
        let mut err = ValidationError::new("account_id_length");
        err.message = Some(
            format!(
                "Account ID must be between 1 and {ACCOUNT_ID_MAX_LENGTH} characters (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        let mut err = ValidationError::new("account_id_format");
        err.message = Some(
            "Account ID may only contain ASCII letters, digits, '-', '_' and '.'".into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Path segment identifying the account a request acts on.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountPath {
    #[validate(custom(function = "validate_account_id"))]
    pub account_id: String,
}

/// Path segments identifying one history record of an account.
#[derive(Debug, Deserialize, Validate)]
pub struct HistoryRecordPath {
    #[validate(custom(function = "validate_account_id"))]
    pub account_id: String,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_account_id_valid() {
        assert!(validate_account_id("uid-42").is_ok());
        assert!(validate_account_id("Abc_def.9").is_ok());
        assert!(validate_account_id(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_validate_account_id_invalid_length() {
        assert!(validate_account_id("").is_err());
        assert!(validate_account_id(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_account_id_invalid_format() {
        assert!(validate_account_id("uid 42").is_err()); // space
        assert!(validate_account_id("uid/42").is_err()); // separator
        assert!(validate_account_id("uïd").is_err()); // non ascii
    }

    #[test]
    fn test_account_path_uses_validator() {
        let path = AccountPath {
            account_id: "bad id".into(),
        };
        assert!(path.validate().is_err());
    }
}
