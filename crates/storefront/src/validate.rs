//! Input checks run before anything is sent to the platform.

use std::sync::LazyLock;

use regex::Regex;

use cartline_core::Email;

use crate::error::{Error, Result};
use crate::platform::CustomerDraft;

/// Letters and spaces only: no digits, no punctuation.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[^\d!@#№$%^&*()_+=\[\]{}|;:'"<>,.?/\\]+$"#).expect("Invalid regex")
});

/// Whether `value` is non-empty and holds no digits or special characters.
#[must_use]
pub fn not_empty(value: &str) -> bool {
    NAME_PATTERN.is_match(value)
}

/// Check a registration draft.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming the first offending field.
pub fn customer_draft(draft: &CustomerDraft) -> Result<()> {
    Email::parse(&draft.email).map_err(|e| Error::InvalidInput(format!("email: {e}")))?;
    if draft.password.is_empty() {
        return Err(Error::InvalidInput("password: must not be empty".to_string()));
    }
    if !not_empty(&draft.first_name) {
        return Err(Error::InvalidInput("first name: letters only".to_string()));
    }
    if !not_empty(&draft.last_name) {
        return Err(Error::InvalidInput("last name: letters only".to_string()));
    }
    Ok(())
}

impl CustomerDraft {
    /// Check the draft before signing up.
    ///
    /// # Errors
    ///
    /// See [`customer_draft`].
    pub fn validate(&self) -> Result<()> {
        customer_draft(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CustomerDraft {
        CustomerDraft {
            email: "jane@example.com".to_string(),
            password: "Secret#123".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            date_of_birth: None,
            addresses: Vec::new(),
        }
    }

    #[test]
    fn test_not_empty_accepts_letters_and_spaces() {
        assert!(not_empty("Jane"));
        assert!(not_empty("Mary Ann"));
        assert!(not_empty("Zoë"));
        assert!(not_empty("Иван"));
    }

    #[test]
    fn test_not_empty_rejects_digits_and_symbols() {
        assert!(!not_empty(""));
        assert!(!not_empty("Jane2"));
        assert!(!not_empty("Jane!"));
        assert!(!not_empty("a.b"));
        assert!(!not_empty("№1"));
        assert!(!not_empty(r"back\slash"));
    }

    #[test]
    fn test_customer_draft_checks() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.first_name = "J4ne".to_string();
        assert!(matches!(
            customer_draft(&bad),
            Err(Error::InvalidInput(m)) if m.starts_with("first name")
        ));

        let mut bad = draft();
        bad.email = "nope".to_string();
        assert!(matches!(
            customer_draft(&bad),
            Err(Error::InvalidInput(m)) if m.starts_with("email")
        ));

        let mut bad = draft();
        bad.password.clear();
        assert!(customer_draft(&bad).is_err());
    }
}
