//! Input validation.
//!
//! Validates variable names and environment names before they reach disk.

use crate::error::{Result, ValidationError};

/// Upper-case a variable name and check it.
///
/// Variable names must be valid environment variable names once
/// upper-cased:
/// - Only A-Z, 0-9, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn normalize_name(name: &str) -> Result<String> {
    let key = name.trim().to_ascii_uppercase();

    if key.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    if key.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidName {
            key,
            reason: "cannot start with a digit".to_string(),
        }
        .into());
    }

    let invalid = key
        .chars()
        .enumerate()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_');
    if let Some((i, ch)) = invalid {
        return Err(ValidationError::InvalidName {
            reason: format!(
                "invalid character '{}' at position {}. Only A-Z, 0-9, and underscore are allowed",
                ch,
                i + 1
            ),
            key,
        }
        .into());
    }

    Ok(key)
}

/// Check an environment name.
///
/// The name doubles as the file stem, so it must be non-empty, must not
/// start with a dot and must not contain path separators.
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn validate_environment(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    let reason = if name.starts_with('.') {
        Some("cannot start with a dot")
    } else if name.contains(['/', '\\']) {
        Some("cannot contain path separators")
    } else if name.chars().any(char::is_control) {
        Some("cannot contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidEnvironment {
            name: name.to_string(),
            reason: reason.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(normalize_name("DATABASE_URL").unwrap(), "DATABASE_URL");
        assert_eq!(normalize_name("api_key").unwrap(), "API_KEY");
        assert_eq!(normalize_name("Secret_123").unwrap(), "SECRET_123");
        assert_eq!(normalize_name("_private").unwrap(), "_PRIVATE");
        assert_eq!(normalize_name(" a ").unwrap(), "A");
    }

    #[test]
    fn test_invalid_names() {
        assert!(normalize_name("").is_err());
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name("123_KEY").is_err());
        assert!(normalize_name("API-KEY").is_err());
        assert!(normalize_name("API.KEY").is_err());
        assert!(normalize_name("API KEY").is_err());
        assert!(normalize_name("API@KEY").is_err());
    }

    #[test]
    fn test_environment_names() {
        assert!(validate_environment("staging").is_ok());
        assert!(validate_environment("prod-eu").is_ok());
        assert!(validate_environment("").is_err());
        assert!(validate_environment(".hidden").is_err());
        assert!(validate_environment("../escape").is_err());
        assert!(validate_environment("a\\b").is_err());
    }
}
