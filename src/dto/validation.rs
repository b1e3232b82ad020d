//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest member id accepted; ids double as realtime keys and document ids.
const MEMBER_ID_MAX_LEN: usize = 128;
/// Characters the realtime database forbids inside a key.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Validates that a member id is usable both as a document id and a realtime key.
///
/// # Examples
///
/// ```ignore
/// validate_member_id("x")        // Ok
/// validate_member_id("")         // Err - empty
/// validate_member_id("a/b")      // Err - path separator
/// ```
pub fn validate_member_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > MEMBER_ID_MAX_LEN {
        let mut err = ValidationError::new("member_id_length");
        err.message = Some(
            format!(
                "Member ID must be between 1 and {MEMBER_ID_MAX_LEN} bytes (got {})",
                id.len()
            )
            .into(),
        );
        return Err(err);
    }

    if id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_KEY_CHARS.contains(&c))
    {
        let mut err = ValidationError::new("member_id_format");
        err.message =
            Some("Member ID must not contain whitespace or any of . # $ [ ] /".into());
        return Err(err);
    }

    Ok(())
}

/// Validates every id of a member id list.
pub fn validate_member_ids(ids: &[String]) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| validate_member_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_member_id_valid() {
        assert!(validate_member_id("x").is_ok());
        assert!(validate_member_id("d4Xk9q2mZ0").is_ok());
        assert!(validate_member_id("ada@example_com").is_ok());
    }

    #[test]
    fn test_validate_member_id_invalid_length() {
        assert!(validate_member_id("").is_err());
        assert!(validate_member_id(&"a".repeat(MEMBER_ID_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_member_id_invalid_format() {
        assert!(validate_member_id("a/b").is_err()); // path separator
        assert!(validate_member_id("a.b").is_err());
        assert!(validate_member_id("a b").is_err()); // space
        assert!(validate_member_id("$ref").is_err());
    }

    #[test]
    fn test_validate_member_ids_reports_first_bad_id() {
        assert!(validate_member_ids(&["a".into(), "b".into()]).is_ok());
        assert!(validate_member_ids(&["a".into(), "b#".into()]).is_err());
    }
}
