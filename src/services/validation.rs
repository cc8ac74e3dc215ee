//! Field rules shared by the service inputs.

use validator::ValidationError;

/// Letters, digits, `_` and `-`
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug");
        err.message = Some("Must contain only letters, digits, '_' or '-'".into());
        Err(err)
    }
}

/// Up to six hex digits, without a leading `#`; empty means no color
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if value.len() <= 6 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("Must be at most 6 hexadecimal digits".into());
        Err(err)
    }
}
