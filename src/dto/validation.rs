//! Validation helpers for inbound DTOs.

use validator::ValidationError;

/// Longest accepted display name, in characters.
pub const PLAYER_NAME_MAX_CHARS: usize = 32;

/// Validates a player display name once surrounding whitespace is trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Alice")     // Ok
/// validate_player_name("   ")       // Err - empty
/// validate_player_name("a\u{7}b")   // Err - control character
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();

    if length == 0 || length > PLAYER_NAME_MAX_CHARS {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!("Player name must be 1 to {PLAYER_NAME_MAX_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_name_format");
        err.message = Some("Player name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}
