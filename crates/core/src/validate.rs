//! Field-level validation helpers shared by the entity constructors.
//!
//! Each helper checks a single condition and names the offending field in its
//! error, so callers can validate fields in order and surface the first failure.

use crate::error::{DomainError, DomainResult};

/// Unwrap a required field or fail with `"<field> is required"`.
pub fn required<T>(field: &str, value: Option<T>) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

/// Require a non-blank string no longer than `max` characters.
///
/// Surrounding whitespace is trimmed from the stored value.
pub fn text(field: &str, value: String, max: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    max_len(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Optional text: `None` and blank strings both normalize to `None`.
pub fn optional_text(field: &str, value: Option<String>, max: usize) -> DomainResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => text(field, v, max).map(Some),
    }
}

pub fn max_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_the_field() {
        let err = required::<String>("name", None).unwrap_err();
        assert_eq!(err, DomainError::validation("name is required"));
    }

    #[test]
    fn text_trims_and_bounds() {
        assert_eq!(text("name", "  Tools ".into(), 10).unwrap(), "Tools");
        assert!(text("name", "   ".into(), 10).is_err());
        assert!(text("name", "x".repeat(11), 10).is_err());
    }

    #[test]
    fn optional_text_normalizes_blank_to_none() {
        assert_eq!(optional_text("supplier", Some(" ".into()), 5).unwrap(), None);
        assert_eq!(optional_text("supplier", None, 5).unwrap(), None);
        assert_eq!(
            optional_text("supplier", Some("Acme".into()), 5).unwrap(),
            Some("Acme".to_string())
        );
    }
}
