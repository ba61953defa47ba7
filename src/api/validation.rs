//! Local checks run before any request is sent.

use crate::api::error::ApiError;
use crate::api::models::LoginCredentials;

pub const MAX_USERNAME_CHARS: usize = 100;
pub const MAX_PASSWORD_CHARS: usize = 255;
pub const MAX_ROOM_NAME_CHARS: usize = 100;

/// Check login input and return the credentials to send (username trimmed,
/// password untouched).
pub fn validate_credentials(credentials: &LoginCredentials) -> Result<LoginCredentials, ApiError> {
    let username = bounded_trimmed(
        &credentials.username,
        MAX_USERNAME_CHARS,
        "Username is required",
        "Username too long",
    )?;

    let password_len = credentials.password.chars().count();
    if password_len == 0 {
        return Err(ApiError::Validation("Password is required".to_string()));
    }
    if password_len > MAX_PASSWORD_CHARS {
        return Err(ApiError::Validation("Password too long".to_string()));
    }

    Ok(LoginCredentials {
        username,
        password: credentials.password.clone(),
    })
}

/// Check a room name and return it trimmed.
pub fn validate_room_name(name: &str) -> Result<String, ApiError> {
    bounded_trimmed(
        name,
        MAX_ROOM_NAME_CHARS,
        "Room name is required",
        "Room name too long",
    )
}

fn bounded_trimmed(
    value: &str,
    max_chars: usize,
    empty_message: &str,
    too_long_message: &str,
) -> Result<String, ApiError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(ApiError::Validation(empty_message.to_string()));
    }
    if len > max_chars {
        return Err(ApiError::Validation(too_long_message.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<impl std::fmt::Debug, ApiError>) -> String {
        match result {
            Err(ApiError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn username_is_trimmed_but_password_is_not() {
        let validated =
            validate_credentials(&LoginCredentials::new("  alice ", " secret ")).unwrap();
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.password, " secret ");
    }

    #[test]
    fn username_bounds() {
        assert_eq!(
            message(validate_credentials(&LoginCredentials::new("", "pw"))),
            "Username is required"
        );
        assert_eq!(
            message(validate_credentials(&LoginCredentials::new("   ", "pw"))),
            "Username is required"
        );
        assert_eq!(
            message(validate_credentials(&LoginCredentials::new("a".repeat(101), "pw"))),
            "Username too long"
        );
        assert!(validate_credentials(&LoginCredentials::new("a".repeat(100), "pw")).is_ok());
    }

    #[test]
    fn password_bounds() {
        assert_eq!(
            message(validate_credentials(&LoginCredentials::new("alice", ""))),
            "Password is required"
        );
        assert_eq!(
            message(validate_credentials(&LoginCredentials::new("alice", "p".repeat(256)))),
            "Password too long"
        );
        assert!(validate_credentials(&LoginCredentials::new("alice", "p".repeat(255))).is_ok());
    }

    #[test]
    fn room_name_rules_match_username_rules() {
        assert_eq!(message(validate_room_name("  ")), "Room name is required");
        assert_eq!(message(validate_room_name(&"r".repeat(101))), "Room name too long");
        assert_eq!(validate_room_name("  General ").unwrap(), "General");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let name = "é".repeat(100);
        assert_eq!(validate_room_name(&name).unwrap(), name);
    }
}
