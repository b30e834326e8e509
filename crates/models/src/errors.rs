use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
}

pub(crate) fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::Validation(msg.into())
}

/// Reject blank strings.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() { return Err(invalid(format!("{field} required"))); }
    Ok(())
}

/// Reject negative counts and amounts.
pub fn require_non_negative(field: &str, value: i32) -> Result<(), ModelError> {
    if value < 0 { return Err(invalid(format!("{field} must be >= 0"))); }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid("invalid email"));
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid("invalid email"));
    }
    Ok(())
}
