//! Input validation helpers shared by the orchestration managers.

use crate::error::CoreError;

/// Require a free-text field to contain at least one non-whitespace
/// character.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}
