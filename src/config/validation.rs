//! Configuration validation.
//!
//! Collects every problem in a config file so the operator can fix them in
//! one pass instead of one error per run.

use std::fmt;

/// A single configuration problem.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Dotted path of the offending key
    pub field: String,
    pub message: String,
    /// How to fix it, when there is an obvious fix
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create error for empty required field
    pub fn empty_field(field: &str) -> Self {
        Self::new(field, "must not be empty")
    }

    /// Create error for an address that does not look like an email
    pub fn invalid_email(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' is not a valid email address", value))
            .with_suggestion("use the form user@example.com")
    }

    /// Create error for a name used by two groups
    pub fn duplicate(field: &str, value: &str) -> Self {
        Self::new(field, format!("'{}' is used by more than one group", value))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Convert to Result - Ok if no errors
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configuration error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field));
    }
}

/// Validate a recipient address: non-empty local part and a dotted domain.
pub fn validate_email(value: &str, field: &str, errors: &mut ValidationErrors) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(ValidationError::empty_field(field));
        return;
    }

    let valid = match trimmed.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !domain.contains('@')
                && !trimmed.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        errors.add(ValidationError::invalid_email(field, trimmed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        let mut errors = ValidationErrors::new();
        validate_email("ops@example.com", "a", &mut errors);
        assert!(errors.is_empty());

        for bad in ["", "ops", "ops@", "@example.com", "ops@example", "o ps@example.com"] {
            validate_email(bad, "a", &mut errors);
        }
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_display_lists_every_error() {
        let mut errors = ValidationErrors::new();
        validate_required(" ", "smtp.server", &mut errors);
        errors.add(ValidationError::duplicate("groups[1].name", "oks"));
        let text = errors.to_string();
        assert!(text.contains("2 configuration error(s)"));
        assert!(text.contains("[smtp.server] must not be empty"));
        assert!(text.contains("'oks' is used by more than one group"));
    }
}
